//! Pub/sub transports the notifier can hand envelopes to.

pub mod local;
pub mod redis;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::{DomainEvent, EventType, SubjectKind};
use super::payload::Snapshot;
use crate::ids::{DepartmentId, RecordId};

pub use local::LocalBroker;
pub use self::redis::RedisTransport;

/// The one wire shape published on every channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub event: String,
    pub event_id: Uuid,
    #[serde(rename = "type")]
    pub event_type: EventType,
    pub subject_kind: SubjectKind,
    pub subject_id: RecordId,
    pub department_id: DepartmentId,
    pub occurred_at: DateTime<Utc>,
    pub data: Snapshot,
}

impl From<&DomainEvent> for Envelope {
    fn from(event: &DomainEvent) -> Self {
        Self {
            event: event.event_name(),
            event_id: event.id,
            event_type: event.event_type,
            subject_kind: event.subject_kind,
            subject_id: event.subject_id.clone(),
            department_id: event.department_id.clone(),
            occurred_at: event.occurred_at,
            data: event.payload.clone(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("envelope could not be encoded: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("redis transport failed: {0}")]
    Redis(#[from] ::redis::RedisError),
    #[error("publish to '{channel}' timed out after {millis} ms")]
    Timeout { channel: String, millis: u128 },
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Fire-and-forget publisher; implementations must not wait for subscribers.
#[async_trait]
pub trait Transport: Send + Sync {
    fn name(&self) -> &'static str;

    async fn publish(
        &self,
        channel: &str,
        event_name: &str,
        envelope: &Envelope,
    ) -> Result<(), TransportError>;
}
