use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::directory::Employee;
use crate::ids::{DepartmentId, EmployeeId, UserId};

/// Lifecycle of a leave or absence request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    pub fn label(self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn resulting_status(self) -> RequestStatus {
        match self {
            Decision::Approve => RequestStatus::Approved,
            Decision::Reject => RequestStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveKind {
    Vacation,
    Sick,
    Bereavement,
    Maternity,
    Paternity,
    Unpaid,
}

impl LeaveKind {
    pub fn label(self) -> &'static str {
        match self {
            LeaveKind::Vacation => "vacation",
            LeaveKind::Sick => "sick",
            LeaveKind::Bereavement => "bereavement",
            LeaveKind::Maternity => "maternity",
            LeaveKind::Paternity => "paternity",
            LeaveKind::Unpaid => "unpaid",
        }
    }
}

/// Employee details copied onto a record when it is filed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeRef {
    pub employee_id: EmployeeId,
    pub full_name: String,
    pub department_id: DepartmentId,
}

impl From<Employee> for EmployeeRef {
    fn from(employee: Employee) -> Self {
        Self {
            employee_id: employee.employee_id,
            full_name: employee.full_name,
            department_id: employee.department_id,
        }
    }
}

/// Approve/reject instruction sent by a supervisor or HR officer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionInput {
    pub decision: Decision,
    pub decided_by: UserId,
    #[serde(default)]
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub decided_by: UserId,
    pub decided_at: DateTime<Utc>,
    pub remarks: Option<String>,
}

/// Requests that go through a single approve/reject step.
pub trait Decidable {
    fn status(&self) -> RequestStatus;

    fn record_decision(&mut self, status: RequestStatus, decision: DecisionRecord);
}
