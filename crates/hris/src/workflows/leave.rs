use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Decidable, DecisionRecord, EmployeeRef, LeaveKind, RequestStatus};
use super::repository::StoredRecord;
use crate::ids::{DepartmentId, EmployeeId, RecordId};
use crate::notifications::{Notifiable, Snapshot, SubjectKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveSubmission {
    pub employee_id: EmployeeId,
    pub leave_kind: LeaveKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRequest {
    pub leave_id: RecordId,
    pub employee: EmployeeRef,
    pub leave_kind: LeaveKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: i64,
    pub reason: String,
    pub status: RequestStatus,
    pub submitted_at: DateTime<Utc>,
    pub decision: Option<DecisionRecord>,
    /// Return to work that closed this leave.
    #[serde(default)]
    pub return_id: Option<RecordId>,
}

impl StoredRecord for LeaveRequest {
    fn record_id(&self) -> &RecordId {
        &self.leave_id
    }
}

impl Decidable for LeaveRequest {
    fn status(&self) -> RequestStatus {
        self.status
    }

    fn record_decision(&mut self, status: RequestStatus, decision: DecisionRecord) {
        self.status = status;
        self.decision = Some(decision);
    }
}

impl Notifiable for LeaveRequest {
    const KIND: SubjectKind = SubjectKind::Leave;

    fn subject_id(&self) -> &RecordId {
        &self.leave_id
    }

    fn department_id(&self) -> &DepartmentId {
        &self.employee.department_id
    }

    fn snapshot(&self) -> Snapshot {
        let decision = self.decision.as_ref();
        Snapshot::builder()
            .text("leave_id", &self.leave_id)
            .text("employee_id", &self.employee.employee_id)
            .text("employee_name", &self.employee.full_name)
            .text("department_id", &self.employee.department_id)
            .text("leave_kind", self.leave_kind.label())
            .date("start_date", self.start_date)
            .date("end_date", self.end_date)
            .number("days", self.days)
            .text("reason", &self.reason)
            .text("status", self.status.label())
            .timestamp("submitted_at", self.submitted_at)
            .optional_text("decided_by", decision.map(|d| &d.decided_by))
            .optional_timestamp("decided_at", decision.map(|d| d.decided_at))
            .optional_text("remarks", decision.and_then(|d| d.remarks.as_ref()))
            .optional_text("return_id", self.return_id.as_ref())
            .build()
    }
}
