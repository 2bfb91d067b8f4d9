//! Error types for the event store.

use thiserror::Error;

/// Errors that can occur in store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A required field is missing or malformed. `field` uses the JSON field name.
    #[error("{message}")]
    Validation { field: &'static str, message: String },

    #[error("Event not found: {0}")]
    NotFound(String),

    /// Lock or write failure. The mutation was not applied.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub(crate) fn missing(field: &'static str) -> Self {
        StoreError::Validation {
            field,
            message: format!("Missing required field: {field}"),
        }
    }

    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        StoreError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Field name for validation errors, `None` for every other kind.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            StoreError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Storage(err.to_string())
    }
}

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
