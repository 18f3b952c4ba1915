//! Shared value types produced by the classifiers and stores.

use serde::{Deserialize, Serialize};

/// Outcome of classifying a shell command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum CommandDecision {
    Allow,
    /// Never executed. `reason` is shown to the user, not the matched regex.
    Forbidden { reason: String },
    /// Requires explicit human approval before the sandbox runs it.
    Dangerous { reason: String },
}

impl CommandDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, CommandDecision::Allow)
    }

    pub fn is_forbidden(&self) -> bool {
        matches!(self, CommandDecision::Forbidden { .. })
    }

    pub fn is_dangerous(&self) -> bool {
        matches!(self, CommandDecision::Dangerous { .. })
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            CommandDecision::Allow => None,
            CommandDecision::Forbidden { reason } | CommandDecision::Dangerous { reason } => {
                Some(reason)
            }
        }
    }
}

/// Outcome of classifying a filesystem access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum PathDecision {
    Allow,
    Blocked { reason: String },
}

impl PathDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, PathDecision::Allow)
    }

    pub fn is_blocked(&self) -> bool {
        matches!(self, PathDecision::Blocked { .. })
    }
}

/// A dangerous command awaiting a human approve/deny decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingCommand {
    pub id: String,
    pub session_id: String,
    pub chat_id: i64,
    pub command: String,
    pub cwd: String,
    pub reason: String,
    /// Unix seconds at insertion time.
    pub created_at: u64,
}
