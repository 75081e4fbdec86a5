use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::EmployeeRef;
use super::repository::StoredRecord;
use crate::ids::{DepartmentId, EmployeeId, RecordId};
use crate::notifications::{Notifiable, Snapshot, SubjectKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnSubmission {
    pub employee_id: EmployeeId,
    /// Approved leave this return closes, if any.
    #[serde(default)]
    pub leave_id: Option<RecordId>,
    pub returned_on: NaiveDate,
    #[serde(default)]
    pub remarks: Option<String>,
}

/// Return-to-work record; processed as soon as it is filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnToWork {
    pub rtw_id: RecordId,
    pub employee: EmployeeRef,
    pub leave_id: Option<RecordId>,
    pub returned_on: NaiveDate,
    pub remarks: Option<String>,
    pub processed_at: DateTime<Utc>,
}

impl ReturnToWork {
    pub const STATUS: &'static str = "processed";
}

impl StoredRecord for ReturnToWork {
    fn record_id(&self) -> &RecordId {
        &self.rtw_id
    }
}

impl Notifiable for ReturnToWork {
    const KIND: SubjectKind = SubjectKind::ReturnToWork;

    fn subject_id(&self) -> &RecordId {
        &self.rtw_id
    }

    fn department_id(&self) -> &DepartmentId {
        &self.employee.department_id
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot::builder()
            .text("rtw_id", &self.rtw_id)
            .text("employee_id", &self.employee.employee_id)
            .text("employee_name", &self.employee.full_name)
            .text("department_id", &self.employee.department_id)
            .optional_text("leave_id", self.leave_id.as_ref())
            .date("returned_on", self.returned_on)
            .optional_text("remarks", self.remarks.as_ref())
            .text("status", Self::STATUS)
            .timestamp("processed_at", self.processed_at)
            .build()
    }
}
