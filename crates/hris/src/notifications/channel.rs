use serde::Serialize;

use crate::ids::UserId;

/// Naming scheme for the two channel kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelNames {
    pub shared: String,
    pub private_prefix: String,
}

impl Default for ChannelNames {
    fn default() -> Self {
        Self {
            shared: "hris.broadcast".to_string(),
            private_prefix: "hris.supervisor".to_string(),
        }
    }
}

impl ChannelNames {
    pub fn resolve(&self, target: &ChannelTarget) -> String {
        match target {
            ChannelTarget::Shared => self.shared.clone(),
            ChannelTarget::Private(user_id) => self.private(user_id),
        }
    }

    pub fn private(&self, user_id: &UserId) -> String {
        format!("{}.{}", self.private_prefix, user_id)
    }

    /// Shared first, then the recipient's private channel if there is one.
    pub fn targets_for(recipient: Option<&UserId>) -> Vec<ChannelTarget> {
        let mut targets = vec![ChannelTarget::Shared];
        if let Some(user_id) = recipient {
            targets.push(ChannelTarget::Private(user_id.clone()));
        }
        targets
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "recipient", rename_all = "snake_case")]
pub enum ChannelTarget {
    Shared,
    Private(UserId),
}

impl ChannelTarget {
    pub fn label(&self) -> &'static str {
        match self {
            ChannelTarget::Shared => "shared",
            ChannelTarget::Private(_) => "private",
        }
    }
}
