//! State machine error type shared by domain crates.

use thiserror::Error;

use crate::error::Error;

/// Errors raised by a rejected state transition
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StateError {
    #[error("Invalid transition: cannot leave {from} via {event}")]
    InvalidTransition { from: String, event: String },

    #[error("Terminal state: {0} cannot transition")]
    TerminalState(String),
}

impl From<StateError> for Error {
    fn from(err: StateError) -> Self {
        Error::Conflict(err.to_string())
    }
}
