//! Error taxonomy shared by every component that touches the event log.
//! Client faults (validation, missing target) are kept apart from storage faults
//! so the HTTP layer can pick a status and decide how much detail to reveal.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EventError {
    /// Malformed or missing required input. Never retried.
    #[error("{0}")]
    Validation(String),

    /// The operation target does not exist.
    #[error("event {id} not found")]
    NotFound { id: String },

    /// The persistence dependency failed or is unreachable.
    #[error("storage error: {0}")]
    Storage(String),
}

impl EventError {
    pub fn validation(msg: impl Into<String>) -> Self {
        EventError::Validation(msg.into())
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        EventError::NotFound { id: id.into() }
    }

    pub fn storage(msg: impl std::fmt::Display) -> Self {
        EventError::Storage(msg.to_string())
    }

    pub fn is_client_fault(&self) -> bool {
        !matches!(self, EventError::Storage(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            EventError::Validation(_) => "validation_error",
            EventError::NotFound { .. } => "not_found",
            EventError::Storage(_) => "storage_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, EventError>;
