use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::config::NotificationConfig;
use crate::directory::{
    DirectoryError, DirectorySeed, InMemoryDirectory, SupervisorRegistry,
};
use crate::ids::{DepartmentId, RecordId, UserId};
use crate::notifications::event::{DomainEvent, EventType, SubjectKind};
use crate::notifications::inbox::{InboxError, InboxPolicy, InboxStore, InMemoryInbox, Notification};
use crate::notifications::payload::{Notifiable, Snapshot};
use crate::notifications::transport::{Envelope, Transport, TransportError};
use crate::notifications::EventNotifier;

pub(super) struct SampleLeave {
    pub(super) leave_id: RecordId,
    pub(super) department_id: DepartmentId,
    pub(super) status: &'static str,
}

impl SampleLeave {
    pub(super) fn in_department(department: &str) -> Self {
        Self {
            leave_id: RecordId::new("leave-000901"),
            department_id: DepartmentId::new(department),
            status: "pending",
        }
    }
}

impl Notifiable for SampleLeave {
    const KIND: SubjectKind = SubjectKind::Leave;

    fn subject_id(&self) -> &RecordId {
        &self.leave_id
    }

    fn department_id(&self) -> &DepartmentId {
        &self.department_id
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::builder()
            .text("leave_id", &self.leave_id)
            .text("department_id", &self.department_id)
            .text("status", self.status)
            .build()
    }
}

pub(super) fn created_event(department: &str) -> DomainEvent {
    DomainEvent::capture(EventType::RequestCreated, &SampleLeave::in_department(department))
}

pub(super) fn config(policy: InboxPolicy) -> NotificationConfig {
    NotificationConfig {
        publish_timeout: Duration::from_millis(50),
        inbox_policy: policy,
        ..NotificationConfig::default()
    }
}

pub(super) fn directory() -> Arc<InMemoryDirectory> {
    Arc::new(InMemoryDirectory::from_seed(DirectorySeed::sample()))
}

pub(super) fn notifier_with(
    transport: Arc<dyn Transport>,
    registry: Arc<dyn SupervisorRegistry>,
    inbox: Arc<dyn InboxStore>,
    policy: InboxPolicy,
) -> EventNotifier {
    EventNotifier::new(transport, registry, inbox, &config(policy))
}

pub(super) fn recording_notifier(
    policy: InboxPolicy,
) -> (EventNotifier, Arc<RecordingTransport>, Arc<InMemoryInbox>) {
    let transport = Arc::new(RecordingTransport::default());
    let inbox = Arc::new(InMemoryInbox::default());
    let notifier = notifier_with(transport.clone(), directory(), inbox.clone(), policy);
    (notifier, transport, inbox)
}

pub(super) fn envelope(event: &str, event_id: Uuid) -> Envelope {
    Envelope {
        event: event.to_string(),
        event_id,
        event_type: EventType::StatusChanged,
        subject_kind: SubjectKind::Leave,
        subject_id: RecordId::new("leave-000321"),
        department_id: DepartmentId::new("finance"),
        occurred_at: fixed_time(),
        data: Snapshot::builder().text("status", "approved").build(),
    }
}

fn fixed_time() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2026-04-01T09:00:00Z")
        .expect("valid timestamp")
        .with_timezone(&Utc)
}

#[derive(Debug, Clone, PartialEq)]
pub(super) struct Published {
    pub(super) channel: String,
    pub(super) event_name: String,
    pub(super) envelope: Envelope,
}

#[derive(Default)]
pub(super) struct RecordingTransport {
    published: Mutex<Vec<Published>>,
}

impl RecordingTransport {
    pub(super) fn published(&self) -> Vec<Published> {
        self.published.lock().expect("transport mutex poisoned").clone()
    }

    pub(super) fn channels(&self) -> Vec<String> {
        self.published()
            .into_iter()
            .map(|message| message.channel)
            .collect()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn publish(
        &self,
        channel: &str,
        event_name: &str,
        envelope: &Envelope,
    ) -> Result<(), TransportError> {
        self.published
            .lock()
            .expect("transport mutex poisoned")
            .push(Published {
                channel: channel.to_string(),
                event_name: event_name.to_string(),
                envelope: envelope.clone(),
            });
        Ok(())
    }
}

pub(super) struct FailingTransport;

#[async_trait]
impl Transport for FailingTransport {
    fn name(&self) -> &'static str {
        "failing"
    }

    async fn publish(
        &self,
        _channel: &str,
        _event_name: &str,
        _envelope: &Envelope,
    ) -> Result<(), TransportError> {
        Err(TransportError::Unavailable("broker offline".to_string()))
    }
}

/// Never answers within the configured publish timeout.
pub(super) struct StalledTransport;

#[async_trait]
impl Transport for StalledTransport {
    fn name(&self) -> &'static str {
        "stalled"
    }

    async fn publish(
        &self,
        _channel: &str,
        _event_name: &str,
        _envelope: &Envelope,
    ) -> Result<(), TransportError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(())
    }
}

pub(super) struct FailingInbox;

impl InboxStore for FailingInbox {
    fn insert(&self, _notification: Notification) -> Result<Notification, InboxError> {
        Err(InboxError::Unavailable("table locked".to_string()))
    }

    fn mark_read(&self, _id: Uuid, _at: DateTime<Utc>) -> Result<Notification, InboxError> {
        Err(InboxError::Unavailable("table locked".to_string()))
    }

    fn visible_to(&self, _user: &UserId) -> Result<Vec<Notification>, InboxError> {
        Err(InboxError::Unavailable("table locked".to_string()))
    }
}

pub(super) struct FailingRegistry;

impl SupervisorRegistry for FailingRegistry {
    fn supervisor_for(&self, _department: &DepartmentId) -> Result<Option<UserId>, DirectoryError> {
        Err(DirectoryError::Unavailable("assignments offline".to_string()))
    }

    fn supervised_departments(&self, _user: &UserId) -> Result<Vec<DepartmentId>, DirectoryError> {
        Err(DirectoryError::Unavailable("assignments offline".to_string()))
    }
}
