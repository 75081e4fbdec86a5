use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::directory::{DirectorySeed, InMemoryDirectory};
use crate::ids::{EmployeeId, RecordId, UserId};
use crate::notifications::{DeliveryReport, DomainEvent, Notify};
use crate::workflows::repository::{InMemoryStore, RecordStore, RepositoryError, StoredRecord};
use crate::workflows::{
    AbsenceSubmission, Decision, DecisionInput, HrService, LeaveKind, LeaveSubmission,
    ReturnSubmission, WorkflowStores,
};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn leave_submission(employee: &str) -> LeaveSubmission {
    LeaveSubmission {
        employee_id: EmployeeId::new(employee),
        leave_kind: LeaveKind::Vacation,
        start_date: date(2026, 11, 2),
        end_date: date(2026, 11, 6),
        reason: "Family visit".to_string(),
    }
}

pub(super) fn absence_submission(employee: &str) -> AbsenceSubmission {
    AbsenceSubmission {
        employee_id: EmployeeId::new(employee),
        absent_on: date(2026, 10, 20),
        reason: "Medical appointment".to_string(),
    }
}

pub(super) fn return_submission(employee: &str, leave_id: Option<RecordId>) -> ReturnSubmission {
    ReturnSubmission {
        employee_id: EmployeeId::new(employee),
        leave_id,
        returned_on: date(2026, 11, 9),
        remarks: Some("Fit for duty".to_string()),
    }
}

pub(super) fn approve(by: &str) -> DecisionInput {
    DecisionInput {
        decision: Decision::Approve,
        decided_by: UserId::new(by),
        remarks: Some("Enjoy".to_string()),
    }
}

pub(super) fn reject(by: &str) -> DecisionInput {
    DecisionInput {
        decision: Decision::Reject,
        decided_by: UserId::new(by),
        remarks: None,
    }
}

/// Notifier double that only records what it was asked to deliver.
#[derive(Default)]
pub(super) struct RecordingNotifier {
    events: Mutex<Vec<DomainEvent>>,
}

impl RecordingNotifier {
    pub(super) fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

#[async_trait]
impl Notify for RecordingNotifier {
    async fn notify(&self, event: DomainEvent) -> DeliveryReport {
        let report = DeliveryReport {
            event_id: event.id,
            event: event.event_name(),
            subject_id: event.subject_id.clone(),
            recipient: None,
            deliveries: Vec::new(),
            inbox: Vec::new(),
        };
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(event);
        report
    }
}

pub(super) fn build_service() -> (Arc<HrService>, Arc<RecordingNotifier>, WorkflowStores) {
    build_service_with(WorkflowStores::in_memory())
}

pub(super) fn build_service_with(
    stores: WorkflowStores,
) -> (Arc<HrService>, Arc<RecordingNotifier>, WorkflowStores) {
    let directory = Arc::new(InMemoryDirectory::from_seed(DirectorySeed::sample()));
    let notifier = Arc::new(RecordingNotifier::default());
    let service = HrService::new(directory, stores.clone(), notifier.clone());
    (Arc::new(service), notifier, stores)
}

pub(super) struct UnavailableStore<T>(PhantomData<fn() -> T>);

impl<T> Default for UnavailableStore<T> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

impl<T: StoredRecord> RecordStore<T> for UnavailableStore<T> {
    fn insert(&self, _record: T) -> Result<T, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_if(
        &self,
        _record: T,
        _precondition: &dyn Fn(&T) -> bool,
    ) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &RecordId) -> Result<Option<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// In-memory store whose reads block for a while, widening the gap between
/// a read and the write that follows it.
pub(super) struct SlowReads<T> {
    inner: InMemoryStore<T>,
    delay: Duration,
}

impl<T> SlowReads<T> {
    pub(super) fn new(delay: Duration) -> Self {
        Self {
            inner: InMemoryStore::default(),
            delay,
        }
    }
}

impl<T: StoredRecord> RecordStore<T> for SlowReads<T> {
    fn insert(&self, record: T) -> Result<T, RepositoryError> {
        self.inner.insert(record)
    }

    fn update_if(
        &self,
        record: T,
        precondition: &dyn Fn(&T) -> bool,
    ) -> Result<(), RepositoryError> {
        self.inner.update_if(record, precondition)
    }

    fn fetch(&self, id: &RecordId) -> Result<Option<T>, RepositoryError> {
        std::thread::sleep(self.delay);
        self.inner.fetch(id)
    }

    fn list(&self) -> Result<Vec<T>, RepositoryError> {
        self.inner.list()
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
