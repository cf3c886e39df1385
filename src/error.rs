//! Error taxonomy for the focus-session core

use serde::Serialize;
use thiserror::Error;

/// A user-correctable input problem (duration settings, edited timer text)
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// An operation was invoked in a state that does not allow it
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid state: {0}")]
pub struct InvalidStateError(pub &'static str);

/// A platform capability is missing or refused the request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0} is unavailable")]
pub struct CapabilityUnavailable(pub &'static str);

/// Errors surfaced by orchestrator commands
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateError),

    #[error("unknown task: {0}")]
    UnknownTask(u64),
}
