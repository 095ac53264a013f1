//! Error types for ID parsing and validation.

use thiserror::Error;

/// Errors that can occur when parsing or validating IDs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdError {
    /// The ID string is empty.
    #[error("ID cannot be empty")]
    Empty,

    /// The ID is missing the underscore separator.
    #[error("ID missing underscore separator")]
    MissingSeparator,

    /// The ID carries a prefix for a different resource type.
    #[error("wrong ID prefix: expected '{expected}', found '{found}'")]
    WrongPrefix {
        expected: &'static str,
        found: String,
    },

    /// The ULID portion of the ID is invalid.
    #[error("invalid ULID: {0}")]
    InvalidUlid(String),
}

impl IdError {
    /// Returns true if this error indicates a prefix mismatch.
    pub fn is_prefix_error(&self) -> bool {
        matches!(self, IdError::WrongPrefix { .. })
    }
}
