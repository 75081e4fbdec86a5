use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::absence::{AbsenceRequest, AbsenceSubmission};
use super::domain::{
    Decidable, DecisionInput, DecisionRecord, EmployeeRef, RequestStatus,
};
use super::leave::{LeaveRequest, LeaveSubmission};
use super::repository::{InMemoryStore, RecordStore, RepositoryError, StoredRecord};
use super::return_to_work::{ReturnSubmission, ReturnToWork};
use super::validation::{inclusive_days, require_ordered, require_reason, SubmissionViolation};
use crate::directory::{DirectoryError, EmployeeDirectory};
use crate::ids::{EmployeeId, RecordId, RecordSequence};
use crate::notifications::{DomainEvent, EventType, Notifiable, Notify};

static LEAVE_SEQUENCE: RecordSequence = RecordSequence::new("leave");
static ABSENCE_SEQUENCE: RecordSequence = RecordSequence::new("absence");
static RETURN_SEQUENCE: RecordSequence = RecordSequence::new("rtw");

/// Record stores backing the three workflows.
#[derive(Clone)]
pub struct WorkflowStores {
    pub leaves: Arc<dyn RecordStore<LeaveRequest>>,
    pub absences: Arc<dyn RecordStore<AbsenceRequest>>,
    pub returns: Arc<dyn RecordStore<ReturnToWork>>,
}

impl WorkflowStores {
    pub fn in_memory() -> Self {
        Self {
            leaves: Arc::new(InMemoryStore::default()),
            absences: Arc::new(InMemoryStore::default()),
            returns: Arc::new(InMemoryStore::default()),
        }
    }
}

/// Leave, absence and return-to-work operations.
///
/// Every state change is written to its store first; the matching
/// [`DomainEvent`] is handed to the notifier only after that write succeeded.
pub struct HrService {
    employees: Arc<dyn EmployeeDirectory>,
    stores: WorkflowStores,
    notifier: Arc<dyn Notify>,
}

impl HrService {
    pub fn new(
        employees: Arc<dyn EmployeeDirectory>,
        stores: WorkflowStores,
        notifier: Arc<dyn Notify>,
    ) -> Self {
        Self {
            employees,
            stores,
            notifier,
        }
    }

    pub async fn submit_leave(
        &self,
        submission: LeaveSubmission,
    ) -> Result<LeaveRequest, WorkflowError> {
        require_ordered(submission.start_date, submission.end_date)?;
        require_reason(&submission.reason)?;
        let employee = self.employee(&submission.employee_id)?;

        let request = LeaveRequest {
            leave_id: LEAVE_SEQUENCE.next_id(),
            employee,
            leave_kind: submission.leave_kind,
            start_date: submission.start_date,
            end_date: submission.end_date,
            days: inclusive_days(submission.start_date, submission.end_date),
            reason: submission.reason.trim().to_string(),
            status: RequestStatus::Pending,
            submitted_at: Utc::now(),
            decision: None,
            return_id: None,
        };

        let stored = self.stores.leaves.insert(request)?;
        info!(
            leave_id = %stored.leave_id,
            employee_id = %stored.employee.employee_id,
            days = stored.days,
            "leave request submitted"
        );
        self.emit(EventType::RequestCreated, &stored).await;
        Ok(stored)
    }

    pub async fn decide_leave(
        &self,
        leave_id: &RecordId,
        input: DecisionInput,
    ) -> Result<LeaveRequest, WorkflowError> {
        self.decide(self.stores.leaves.as_ref(), leave_id, input)
            .await
    }

    pub fn leave(&self, leave_id: &RecordId) -> Result<LeaveRequest, WorkflowError> {
        let record = self
            .stores
            .leaves
            .fetch(leave_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    pub async fn submit_absence(
        &self,
        submission: AbsenceSubmission,
    ) -> Result<AbsenceRequest, WorkflowError> {
        require_reason(&submission.reason)?;
        let employee = self.employee(&submission.employee_id)?;

        let request = AbsenceRequest {
            absence_id: ABSENCE_SEQUENCE.next_id(),
            employee,
            absent_on: submission.absent_on,
            reason: submission.reason.trim().to_string(),
            status: RequestStatus::Pending,
            submitted_at: Utc::now(),
            decision: None,
        };

        let stored = self.stores.absences.insert(request)?;
        info!(
            absence_id = %stored.absence_id,
            employee_id = %stored.employee.employee_id,
            "absence request submitted"
        );
        self.emit(EventType::RequestCreated, &stored).await;
        Ok(stored)
    }

    pub async fn decide_absence(
        &self,
        absence_id: &RecordId,
        input: DecisionInput,
    ) -> Result<AbsenceRequest, WorkflowError> {
        self.decide(self.stores.absences.as_ref(), absence_id, input)
            .await
    }

    pub fn absence(&self, absence_id: &RecordId) -> Result<AbsenceRequest, WorkflowError> {
        let record = self
            .stores
            .absences
            .fetch(absence_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// File a return to work, closing the referenced leave when one is given.
    ///
    /// A leave is closed by at most one return; later attempts are rejected
    /// on `leave_id`.
    pub async fn record_return(
        &self,
        submission: ReturnSubmission,
    ) -> Result<ReturnToWork, WorkflowError> {
        let employee = self.employee(&submission.employee_id)?;
        let rtw_id = RETURN_SEQUENCE.next_id();

        let closed_leave = match &submission.leave_id {
            Some(leave_id) => Some(self.close_leave(
                leave_id,
                &employee,
                submission.returned_on,
                &rtw_id,
            )?),
            None => None,
        };

        let record = ReturnToWork {
            rtw_id,
            employee,
            leave_id: submission.leave_id,
            returned_on: submission.returned_on,
            remarks: non_blank(submission.remarks),
            processed_at: Utc::now(),
        };

        let stored = match self.stores.returns.insert(record) {
            Ok(stored) => stored,
            Err(err) => {
                if let Some(leave) = closed_leave {
                    self.reopen_leave(leave);
                }
                return Err(err.into());
            }
        };
        info!(
            rtw_id = %stored.rtw_id,
            employee_id = %stored.employee.employee_id,
            leave_id = stored.leave_id.as_ref().map(RecordId::as_str).unwrap_or("-"),
            "return to work processed"
        );
        self.emit(EventType::Processed, &stored).await;
        Ok(stored)
    }

    pub fn return_to_work(&self, rtw_id: &RecordId) -> Result<ReturnToWork, WorkflowError> {
        let record = self
            .stores
            .returns
            .fetch(rtw_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    async fn decide<T>(
        &self,
        store: &dyn RecordStore<T>,
        id: &RecordId,
        input: DecisionInput,
    ) -> Result<T, WorkflowError>
    where
        T: StoredRecord + Decidable + Notifiable,
    {
        if input.decided_by.as_str().trim().is_empty() {
            return Err(SubmissionViolation::MissingDecider.into());
        }

        let mut record = store.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        if record.status() != RequestStatus::Pending {
            return Err(WorkflowError::AlreadyDecided {
                id: id.clone(),
                status: record.status(),
            });
        }

        let status = input.decision.resulting_status();
        record.record_decision(
            status,
            DecisionRecord {
                decided_by: input.decided_by,
                decided_at: Utc::now(),
                remarks: non_blank(input.remarks),
            },
        );
        let still_pending = |current: &T| current.status() == RequestStatus::Pending;
        match store.update_if(record.clone(), &still_pending) {
            Ok(()) => {}
            Err(RepositoryError::Stale) => {
                let current = store.fetch(id)?.ok_or(RepositoryError::NotFound)?;
                return Err(WorkflowError::AlreadyDecided {
                    id: id.clone(),
                    status: current.status(),
                });
            }
            Err(other) => return Err(other.into()),
        }
        info!(
            subject_id = %id,
            kind = T::KIND.label(),
            status = status.label(),
            "request decided"
        );

        self.emit(EventType::StatusChanged, &record).await;
        Ok(record)
    }

    /// Check the leave can be closed by `rtw_id` and mark it in one write.
    fn close_leave(
        &self,
        leave_id: &RecordId,
        employee: &EmployeeRef,
        returned_on: NaiveDate,
        rtw_id: &RecordId,
    ) -> Result<LeaveRequest, WorkflowError> {
        let mut leave = self
            .stores
            .leaves
            .fetch(leave_id)?
            .ok_or_else(|| SubmissionViolation::UnknownLeave(leave_id.clone()))?;
        if leave.employee.employee_id != employee.employee_id {
            return Err(SubmissionViolation::LeaveOwnedByAnotherEmployee {
                leave_id: leave_id.clone(),
            }
            .into());
        }
        if leave.status != RequestStatus::Approved {
            return Err(SubmissionViolation::LeaveNotApproved {
                leave_id: leave_id.clone(),
                status: leave.status,
            }
            .into());
        }
        if let Some(existing) = &leave.return_id {
            return Err(SubmissionViolation::LeaveAlreadyReturned {
                leave_id: leave_id.clone(),
                rtw_id: existing.clone(),
            }
            .into());
        }
        if returned_on <= leave.start_date {
            return Err(SubmissionViolation::ReturnBeforeLeaveStart {
                returned_on,
                start_date: leave.start_date,
            }
            .into());
        }

        leave.return_id = Some(rtw_id.clone());
        let open = |current: &LeaveRequest| {
            current.status == RequestStatus::Approved && current.return_id.is_none()
        };
        match self.stores.leaves.update_if(leave.clone(), &open) {
            Ok(()) => Ok(leave),
            Err(RepositoryError::Stale) => {
                let winner = self
                    .stores
                    .leaves
                    .fetch(leave_id)?
                    .and_then(|current| current.return_id)
                    .unwrap_or_else(|| rtw_id.clone());
                Err(SubmissionViolation::LeaveAlreadyReturned {
                    leave_id: leave_id.clone(),
                    rtw_id: winner,
                }
                .into())
            }
            Err(other) => Err(other.into()),
        }
    }

    fn reopen_leave(&self, mut leave: LeaveRequest) {
        let Some(rtw_id) = leave.return_id.take() else {
            return;
        };
        let closed_by_us = |current: &LeaveRequest| current.return_id.as_ref() == Some(&rtw_id);
        if let Err(err) = self.stores.leaves.update_if(leave.clone(), &closed_by_us) {
            warn!(
                leave_id = %leave.leave_id,
                error = %err,
                "could not reopen leave after failed return to work"
            );
        }
    }

    fn employee(&self, employee_id: &EmployeeId) -> Result<EmployeeRef, WorkflowError> {
        let employee = self
            .employees
            .employee(employee_id)?
            .ok_or_else(|| SubmissionViolation::UnknownEmployee(employee_id.clone()))?;
        Ok(employee.into())
    }

    async fn emit<S>(&self, event_type: EventType, subject: &S)
    where
        S: Notifiable + Sync,
    {
        let event = DomainEvent::capture(event_type, subject);
        let report = self.notifier.notify(event).await;
        if !report.fully_delivered() {
            debug!(
                event = %report.event,
                subject_id = %report.subject_id,
                "state change committed with incomplete delivery"
            );
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Error raised by the workflow service.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Violation(#[from] SubmissionViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error("'{id}' has already been {}", .status.label())]
    AlreadyDecided { id: RecordId, status: RequestStatus },
}
