use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::ids::UserId;

/// Which inbox rows the notifier writes for an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InboxPolicy {
    Disabled,
    /// One row for the resolved supervisor, nothing when nobody resolves.
    #[default]
    Addressed,
    /// The addressed row plus one broadcast row per event.
    All,
}

impl InboxPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "disabled" | "off" | "none" => Some(Self::Disabled),
            "addressed" => Some(Self::Addressed),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    pub fn writes_addressed(self) -> bool {
        !matches!(self, Self::Disabled)
    }

    pub fn writes_broadcast(self) -> bool {
        matches!(self, Self::All)
    }
}

/// Durable copy of a delivered event, shown in the inbox until read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub notification_type: String,
    /// `None` means the row is a broadcast visible to everyone.
    pub recipient_user_id: Option<UserId>,
    pub data: Value,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(notification_type: String, recipient: Option<UserId>, data: Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            notification_type,
            recipient_user_id: recipient,
            data,
            read_at: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InboxError {
    #[error("notification not found")]
    NotFound,
    #[error("inbox unavailable: {0}")]
    Unavailable(String),
}

pub trait InboxStore: Send + Sync {
    fn insert(&self, notification: Notification) -> Result<Notification, InboxError>;

    /// Stamp `read_at` once; later calls keep the first timestamp.
    fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<Notification, InboxError>;

    /// Rows addressed to `user` plus broadcast rows, newest first.
    fn visible_to(&self, user: &UserId) -> Result<Vec<Notification>, InboxError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemoryInbox {
    rows: Arc<Mutex<Vec<Notification>>>,
}

impl InMemoryInbox {
    pub fn all(&self) -> Vec<Notification> {
        self.rows.lock().expect("inbox mutex poisoned").clone()
    }
}

impl InboxStore for InMemoryInbox {
    fn insert(&self, notification: Notification) -> Result<Notification, InboxError> {
        let mut guard = self.rows.lock().expect("inbox mutex poisoned");
        guard.push(notification.clone());
        Ok(notification)
    }

    fn mark_read(&self, id: Uuid, at: DateTime<Utc>) -> Result<Notification, InboxError> {
        let mut guard = self.rows.lock().expect("inbox mutex poisoned");
        let row = guard
            .iter_mut()
            .find(|row| row.id == id)
            .ok_or(InboxError::NotFound)?;
        if row.read_at.is_none() {
            row.read_at = Some(at);
        }
        Ok(row.clone())
    }

    fn visible_to(&self, user: &UserId) -> Result<Vec<Notification>, InboxError> {
        let guard = self.rows.lock().expect("inbox mutex poisoned");
        let mut rows: Vec<Notification> = guard
            .iter()
            .filter(|row| match &row.recipient_user_id {
                Some(recipient) => recipient == user,
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
