//! Employee directory and the department → supervisor assignment table.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{DepartmentId, EmployeeId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub employee_id: EmployeeId,
    pub full_name: String,
    pub department_id: DepartmentId,
}

/// Current supervisor of a department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentAssignment {
    pub department_id: DepartmentId,
    pub supervisor_id: UserId,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("directory unavailable: {0}")]
    Unavailable(String),
}

pub trait EmployeeDirectory: Send + Sync {
    fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, DirectoryError>;
}

/// Capability lookups against the department-assignment table.
pub trait SupervisorRegistry: Send + Sync {
    fn supervisor_for(&self, department: &DepartmentId) -> Result<Option<UserId>, DirectoryError>;

    fn supervised_departments(&self, user: &UserId) -> Result<Vec<DepartmentId>, DirectoryError>;

    fn is_supervisor(&self, user: &UserId) -> Result<bool, DirectoryError> {
        Ok(!self.supervised_departments(user)?.is_empty())
    }
}

/// Process-local directory backing both lookups.
#[derive(Debug, Default, Clone)]
pub struct InMemoryDirectory {
    employees: Arc<Mutex<HashMap<EmployeeId, Employee>>>,
    assignments: Arc<Mutex<BTreeMap<DepartmentId, DepartmentAssignment>>>,
}

impl InMemoryDirectory {
    pub fn from_seed(seed: DirectorySeed) -> Self {
        let directory = Self::default();
        for employee in seed.employees {
            directory.add_employee(employee);
        }
        for entry in seed.assignments {
            directory.assign(entry.department_id, entry.supervisor_id);
        }
        directory
    }

    pub fn add_employee(&self, employee: Employee) {
        let mut guard = self.employees.lock().expect("directory mutex poisoned");
        guard.insert(employee.employee_id.clone(), employee);
    }

    /// Make `supervisor` the department's supervisor, replacing any previous one.
    pub fn assign(&self, department: DepartmentId, supervisor: UserId) -> DepartmentAssignment {
        let assignment = DepartmentAssignment {
            department_id: department.clone(),
            supervisor_id: supervisor,
            assigned_at: Utc::now(),
        };
        let mut guard = self.assignments.lock().expect("directory mutex poisoned");
        guard.insert(department, assignment.clone());
        assignment
    }

    pub fn unassign(&self, department: &DepartmentId) -> Option<DepartmentAssignment> {
        let mut guard = self.assignments.lock().expect("directory mutex poisoned");
        guard.remove(department)
    }

    pub fn assignments(&self) -> Vec<DepartmentAssignment> {
        let guard = self.assignments.lock().expect("directory mutex poisoned");
        guard.values().cloned().collect()
    }
}

impl EmployeeDirectory for InMemoryDirectory {
    fn employee(&self, id: &EmployeeId) -> Result<Option<Employee>, DirectoryError> {
        let guard = self.employees.lock().expect("directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

impl SupervisorRegistry for InMemoryDirectory {
    fn supervisor_for(&self, department: &DepartmentId) -> Result<Option<UserId>, DirectoryError> {
        let guard = self.assignments.lock().expect("directory mutex poisoned");
        Ok(guard
            .get(department)
            .map(|assignment| assignment.supervisor_id.clone()))
    }

    fn supervised_departments(&self, user: &UserId) -> Result<Vec<DepartmentId>, DirectoryError> {
        let guard = self.assignments.lock().expect("directory mutex poisoned");
        Ok(guard
            .values()
            .filter(|assignment| &assignment.supervisor_id == user)
            .map(|assignment| assignment.department_id.clone())
            .collect())
    }
}

/// JSON document used to populate the directory at start-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySeed {
    #[serde(default)]
    pub employees: Vec<Employee>,
    #[serde(default)]
    pub assignments: Vec<SeedAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedAssignment {
    pub department_id: DepartmentId,
    pub supervisor_id: UserId,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("unable to read seed file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("seed file {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("seed assigns department '{0}' more than once")]
    DuplicateAssignment(DepartmentId),
}

impl DirectorySeed {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SeedError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| SeedError::Io {
            path: display.clone(),
            source,
        })?;
        let seed: DirectorySeed =
            serde_json::from_str(&raw).map_err(|source| SeedError::Parse {
                path: display,
                source,
            })?;
        seed.validate()?;
        Ok(seed)
    }

    pub fn validate(&self) -> Result<(), SeedError> {
        let mut seen = Vec::with_capacity(self.assignments.len());
        for assignment in &self.assignments {
            if seen.contains(&&assignment.department_id) {
                return Err(SeedError::DuplicateAssignment(
                    assignment.department_id.clone(),
                ));
            }
            seen.push(&assignment.department_id);
        }
        Ok(())
    }

    /// Small organisation used by the demo and by default when no seed file is given.
    pub fn sample() -> Self {
        let employee = |id: &str, name: &str, department: &str| Employee {
            employee_id: EmployeeId::new(id),
            full_name: name.to_string(),
            department_id: DepartmentId::new(department),
        };

        Self {
            employees: vec![
                employee("E-1001", "Amara Okafor", "finance"),
                employee("E-1002", "Jonas Lindqvist", "finance"),
                employee("E-2001", "Priya Raman", "warehouse"),
                employee("E-3001", "Mateo Silva", "facilities"),
            ],
            assignments: vec![
                SeedAssignment {
                    department_id: DepartmentId::new("finance"),
                    supervisor_id: UserId::new("sup-finance"),
                },
                SeedAssignment {
                    department_id: DepartmentId::new("warehouse"),
                    supervisor_id: UserId::new("sup-warehouse"),
                },
            ],
        }
    }
}
