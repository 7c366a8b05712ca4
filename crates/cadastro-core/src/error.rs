//! Error types for the cadastro system
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for cadastro operations
pub type Result<T> = std::result::Result<T, Error>;

/// Outcome taxonomy for a postal-code lookup
///
/// `InvalidFormat` is detected before any network I/O. The other two
/// variants describe the external service; callers decide whether to
/// abort, fall back, or re-invoke.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The code does not normalize to exactly 8 digits
    #[error("postal code must contain exactly 8 digits")]
    InvalidFormat,

    /// The service answered with its explicit not-found marker
    #[error("postal code not found")]
    NotFound,

    /// Transport failure, timeout, or non-success HTTP status
    #[error("address lookup unavailable: {0}")]
    Unavailable(String),
}

/// Core error type for the cadastro system
#[derive(Error, Debug)]
pub enum Error {
    /// An operator-supplied field failed validation
    #[error("invalid {field}: {message}")]
    Validation {
        /// Field that failed
        field: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// Referenced record does not exist
    #[error("record {0} not found")]
    NotFound(i64),

    /// Address lookup failure the active policy does not absorb
    #[error("address lookup failed: {0}")]
    Lookup(#[from] LookupError),

    /// Record store errors
    #[error("record store error: {0}")]
    Store(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Export artifact errors
    #[error("export error: {0}")]
    Export(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a validation error for a named field
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// Create a record store error
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an export error
    pub fn export(msg: impl Into<String>) -> Self {
        Self::Export(msg.into())
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_the_field() {
        let err = Error::validation("name", "must be 2 to 60 characters");
        assert_eq!(err.to_string(), "invalid name: must be 2 to 60 characters");
    }

    #[test]
    fn lookup_error_converts_into_core_error() {
        let err: Error = LookupError::NotFound.into();
        assert!(matches!(err, Error::Lookup(LookupError::NotFound)));
    }
}
