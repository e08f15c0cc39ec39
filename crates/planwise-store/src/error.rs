//! Store error types.

use chrono::NaiveDate;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in a store.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The exclusion constraint rejected a write: an active event already
    /// occupies an overlapping slot on the listed date(s).
    #[error("overlapping event(s) on {dates:?}")]
    Overlap { dates: Vec<NaiveDate> },

    /// The store is unreachable or timed out. Retryable by the caller.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// Unexpected store failure.
    #[error("store failure: {message}")]
    Internal { message: String },
}

impl StoreError {
    /// Creates an exclusion-constraint violation.
    pub fn overlap(dates: Vec<NaiveDate>) -> Self {
        Self::Overlap { dates }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}
