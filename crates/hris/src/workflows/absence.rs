use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{Decidable, DecisionRecord, EmployeeRef, RequestStatus};
use super::repository::StoredRecord;
use crate::ids::{DepartmentId, EmployeeId, RecordId};
use crate::notifications::{Notifiable, Snapshot, SubjectKind};

/// Single-day absence reported ahead of or on the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceSubmission {
    pub employee_id: EmployeeId,
    pub absent_on: NaiveDate,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbsenceRequest {
    pub absence_id: RecordId,
    pub employee: EmployeeRef,
    pub absent_on: NaiveDate,
    pub reason: String,
    pub status: RequestStatus,
    pub submitted_at: DateTime<Utc>,
    pub decision: Option<DecisionRecord>,
}

impl StoredRecord for AbsenceRequest {
    fn record_id(&self) -> &RecordId {
        &self.absence_id
    }
}

impl Decidable for AbsenceRequest {
    fn status(&self) -> RequestStatus {
        self.status
    }

    fn record_decision(&mut self, status: RequestStatus, decision: DecisionRecord) {
        self.status = status;
        self.decision = Some(decision);
    }
}

impl Notifiable for AbsenceRequest {
    const KIND: SubjectKind = SubjectKind::Absence;

    fn subject_id(&self) -> &RecordId {
        &self.absence_id
    }

    fn department_id(&self) -> &DepartmentId {
        &self.employee.department_id
    }

    fn snapshot(&self) -> Snapshot {
        let decision = self.decision.as_ref();
        Snapshot::builder()
            .text("absence_id", &self.absence_id)
            .text("employee_id", &self.employee.employee_id)
            .text("employee_name", &self.employee.full_name)
            .text("department_id", &self.employee.department_id)
            .date("absent_on", self.absent_on)
            .text("reason", &self.reason)
            .text("status", self.status.label())
            .timestamp("submitted_at", self.submitted_at)
            .optional_text("decided_by", decision.map(|d| &d.decided_by))
            .optional_timestamp("decided_at", decision.map(|d| d.decided_at))
            .optional_text("remarks", decision.and_then(|d| d.remarks.as_ref()))
            .build()
    }
}
