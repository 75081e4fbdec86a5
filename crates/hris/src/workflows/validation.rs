use chrono::NaiveDate;

use super::domain::RequestStatus;
use crate::ids::{EmployeeId, RecordId};

/// Submission problems reported back to the caller; no event is emitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionViolation {
    #[error("employee '{0}' is not in the directory")]
    UnknownEmployee(EmployeeId),
    #[error("end date {end} is before start date {start}")]
    EndBeforeStart { start: NaiveDate, end: NaiveDate },
    #[error("a reason is required")]
    MissingReason,
    #[error("decided_by must identify the approver")]
    MissingDecider,
    #[error("leave request '{0}' does not exist")]
    UnknownLeave(RecordId),
    #[error("leave request '{leave_id}' belongs to another employee")]
    LeaveOwnedByAnotherEmployee { leave_id: RecordId },
    #[error("leave request '{leave_id}' is {} and cannot be closed by a return", .status.label())]
    LeaveNotApproved {
        leave_id: RecordId,
        status: RequestStatus,
    },
    #[error("leave request '{leave_id}' was already closed by return '{rtw_id}'")]
    LeaveAlreadyReturned { leave_id: RecordId, rtw_id: RecordId },
    #[error("return date {returned_on} is not after the leave start {start_date}")]
    ReturnBeforeLeaveStart {
        returned_on: NaiveDate,
        start_date: NaiveDate,
    },
}

impl SubmissionViolation {
    /// Name of the request field the violation is about.
    pub fn field(&self) -> &'static str {
        match self {
            SubmissionViolation::UnknownEmployee(_) => "employee_id",
            SubmissionViolation::EndBeforeStart { .. } => "end_date",
            SubmissionViolation::MissingReason => "reason",
            SubmissionViolation::MissingDecider => "decided_by",
            SubmissionViolation::UnknownLeave(_)
            | SubmissionViolation::LeaveOwnedByAnotherEmployee { .. }
            | SubmissionViolation::LeaveNotApproved { .. }
            | SubmissionViolation::LeaveAlreadyReturned { .. } => "leave_id",
            SubmissionViolation::ReturnBeforeLeaveStart { .. } => "returned_on",
        }
    }
}

pub(crate) fn require_reason(reason: &str) -> Result<(), SubmissionViolation> {
    if reason.trim().is_empty() {
        Err(SubmissionViolation::MissingReason)
    } else {
        Ok(())
    }
}

pub(crate) fn require_ordered(start: NaiveDate, end: NaiveDate) -> Result<(), SubmissionViolation> {
    if end < start {
        Err(SubmissionViolation::EndBeforeStart { start, end })
    } else {
        Ok(())
    }
}

/// Inclusive calendar-day count between two ordered dates.
pub(crate) fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}
