//! Error types for scheduler construction.

use thiserror::Error;

/// Errors that can occur when building an admission scheduler.
///
/// Construction is the only fallible surface in this crate: every runtime
/// operation is total, reporting absence through `Option` or `bool`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// The active window must be able to hold at least one item.
    #[error("admission capacity must be at least 1, got {got}")]
    InvalidCapacity { got: usize },

    /// No priority ordering was supplied to the builder.
    #[error("priority ordering not configured")]
    MissingPriority,

    /// No identity matcher was supplied to the builder.
    #[error("identity matcher not configured")]
    MissingIdentity,

    /// No decay function was supplied to the builder.
    #[error("decay function not configured")]
    MissingDecay,
}
