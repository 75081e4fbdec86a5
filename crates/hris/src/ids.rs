//! String-backed identifiers shared by the workflows and the notifier.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(
    /// Employee number as issued by HR.
    EmployeeId
);
string_id!(DepartmentId);
string_id!(
    /// Login identity of a system user; supervisors are addressed by it.
    UserId
);
string_id!(
    /// Identifier of a leave request, absence request or return-to-work record.
    RecordId
);

/// Monotonic per-process sequence producing ids such as `leave-000042`.
#[derive(Debug)]
pub struct RecordSequence {
    prefix: &'static str,
    next: AtomicU64,
}

impl RecordSequence {
    pub const fn new(prefix: &'static str) -> Self {
        Self {
            prefix,
            next: AtomicU64::new(1),
        }
    }

    pub fn next_id(&self) -> RecordId {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        RecordId(format!("{}-{id:06}", self.prefix))
    }
}
