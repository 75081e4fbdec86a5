use std::sync::Arc;

use tracing::warn;

use crate::directory::SupervisorRegistry;
use crate::ids::{DepartmentId, UserId};

/// Turns a department into at most one addressable recipient.
#[derive(Clone)]
pub struct RecipientResolver {
    registry: Arc<dyn SupervisorRegistry>,
}

impl RecipientResolver {
    pub fn new(registry: Arc<dyn SupervisorRegistry>) -> Self {
        Self { registry }
    }

    /// The department's current supervisor, or `None`.
    ///
    /// Lookup failures are logged and read as "no supervisor" so delivery
    /// falls back to the shared channel.
    pub fn resolve(&self, department: &DepartmentId) -> Option<UserId> {
        match self.registry.supervisor_for(department) {
            Ok(recipient) => recipient,
            Err(err) => {
                warn!(
                    department_id = %department,
                    error = %err,
                    "supervisor lookup failed; delivering on shared channel only"
                );
                None
            }
        }
    }

    /// Whether `user` should also listen on a private channel.
    pub fn is_supervisor(&self, user: &UserId) -> bool {
        match self.registry.is_supervisor(user) {
            Ok(flag) => flag,
            Err(err) => {
                warn!(user_id = %user, error = %err, "supervisor capability check failed");
                false
            }
        }
    }
}
