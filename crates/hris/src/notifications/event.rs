use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::payload::{Notifiable, Snapshot};
use crate::ids::{DepartmentId, RecordId};

/// What happened to the subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RequestCreated,
    StatusChanged,
    Processed,
}

impl EventType {
    pub const ALL: [EventType; 3] = [
        EventType::RequestCreated,
        EventType::StatusChanged,
        EventType::Processed,
    ];

    pub fn label(self) -> &'static str {
        match self {
            EventType::RequestCreated => "request_created",
            EventType::StatusChanged => "status_changed",
            EventType::Processed => "processed",
        }
    }
}

/// Which kind of record the event is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    Leave,
    Absence,
    ReturnToWork,
}

impl SubjectKind {
    pub const ALL: [SubjectKind; 3] = [
        SubjectKind::Leave,
        SubjectKind::Absence,
        SubjectKind::ReturnToWork,
    ];

    pub fn label(self) -> &'static str {
        match self {
            SubjectKind::Leave => "leave",
            SubjectKind::Absence => "absence",
            SubjectKind::ReturnToWork => "return_to_work",
        }
    }
}

/// A committed state change, delivered transiently to subscribers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: Uuid,
    pub event_type: EventType,
    pub subject_kind: SubjectKind,
    pub subject_id: RecordId,
    pub department_id: DepartmentId,
    pub occurred_at: DateTime<Utc>,
    pub payload: Snapshot,
}

impl DomainEvent {
    /// Capture `subject` as it looks right now.
    pub fn capture<S: Notifiable>(event_type: EventType, subject: &S) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            subject_kind: S::KIND,
            subject_id: subject.subject_id().clone(),
            department_id: subject.department_id().clone(),
            occurred_at: Utc::now(),
            payload: subject.snapshot(),
        }
    }

    /// Wire name, e.g. `leave.request_created`.
    pub fn event_name(&self) -> String {
        event_name(self.subject_kind, self.event_type)
    }
}

pub fn event_name(kind: SubjectKind, event_type: EventType) -> String {
    format!("{}.{}", kind.label(), event_type.label())
}

/// Every event name a subscriber is expected to understand.
pub fn known_event_names() -> Vec<String> {
    SubjectKind::ALL
        .iter()
        .flat_map(|kind| {
            EventType::ALL
                .iter()
                .map(move |event_type| event_name(*kind, *event_type))
        })
        .collect()
}
