//! Leave, absence and return-to-work workflows.
//!
//! Each operation persists its record and then notifies; submission checks
//! stay minimal (known employee, ordered dates, a reason).

pub mod absence;
pub mod domain;
pub mod leave;
pub mod repository;
pub mod return_to_work;
pub mod router;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use absence::{AbsenceRequest, AbsenceSubmission};
pub use domain::{
    Decidable, Decision, DecisionInput, DecisionRecord, EmployeeRef, LeaveKind, RequestStatus,
};
pub use leave::{LeaveRequest, LeaveSubmission};
pub use repository::{InMemoryStore, RecordStore, RepositoryError, StoredRecord};
pub use return_to_work::{ReturnSubmission, ReturnToWork};
pub use router::workflow_router;
pub use service::{HrService, WorkflowError, WorkflowStores};
pub use validation::SubmissionViolation;
