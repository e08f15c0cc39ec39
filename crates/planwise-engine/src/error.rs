//! Engine error types.
//!
//! Expected conditions (conflict, not-found, validation) are returned as
//! values; the caller can map each variant to a stable status/message pair
//! without inspecting error text.

use chrono::NaiveDate;
use thiserror::Error;

use planwise_store::StoreError;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur in the event lifecycle manager.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Input failed an invariant (e.g. start time not before end time).
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// Another active event occupies an overlapping slot on the listed
    /// date(s). For recurring creation, every conflicting date is carried.
    #[error("schedule conflict on {dates:?}")]
    Conflict { dates: Vec<NaiveDate> },

    /// The entity is absent, or the caller does not own it. Both cases
    /// produce the same signal: existence is hidden from non-owners.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// A downstream store was unreachable or timed out. Retryable.
    #[error("store unavailable: {message}")]
    Unavailable { message: String },

    /// Anything unclassified.
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a conflict error for the given dates.
    pub fn conflict(dates: Vec<NaiveDate>) -> Self {
        Self::Conflict { dates }
    }

    /// Creates a not-found error.
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

impl From<StoreError> for EngineError {
    fn from(err: StoreError) -> Self {
        match err {
            // A constraint rejection on insert is the authoritative
            // conflict signal.
            StoreError::Overlap { dates } => Self::Conflict { dates },
            StoreError::Unavailable { message } => Self::Unavailable { message },
            StoreError::Internal { message } => Self::Internal { message },
        }
    }
}
