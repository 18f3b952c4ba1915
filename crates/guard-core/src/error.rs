//! Error taxonomy for the guard core.
//!
//! Each variant corresponds to one of the five propagation classes; the HTTP
//! boundary in `guardbot` maps these to status codes, never forwarding a
//! source chain or stack trace to the user.

use crate::types::PendingCommand;

#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    #[error("{0}")]
    PolicyRejected(String),

    #[error("approval required for pending command {}", .0.id)]
    ApprovalRequired(PendingCommand),

    #[error("transient error: {0}")]
    Transient(String),

    #[error("server busy, try again shortly")]
    CapacityExceeded,

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub type GuardResult<T> = Result<T, GuardError>;
