//! Event lifecycle engine.
//!
//! [`EventManager`] orchestrates create/update/delete for standalone and
//! recurring events: it expands recurrence rules, pre-checks candidate slots
//! against the conflict scanner in [`conflict`], and applies an
//! all-or-nothing commit policy for recurring series. Every store call runs
//! under a configured timeout; a timeout surfaces as
//! [`EngineError::Unavailable`], never a silent hang.

pub mod conflict;
pub mod error;
pub mod manager;

use std::time::Duration;

pub use conflict::has_conflict;
pub use error::{EngineError, EngineResult};
pub use manager::{CreatedEvent, EventManager};

use planwise_store::StoreResult;

/// Engine tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound on any single store operation.
    pub store_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
        }
    }
}

impl EngineConfig {
    /// Builder: set the store operation timeout.
    #[must_use]
    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }
}

/// Awaits a store operation under `timeout`, mapping both store failures
/// and elapsed deadlines into engine errors.
pub(crate) async fn bounded<T>(
    timeout: Duration,
    fut: impl Future<Output = StoreResult<T>>,
) -> EngineResult<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(EngineError::from),
        Err(_) => Err(EngineError::unavailable("store operation timed out")),
    }
}
