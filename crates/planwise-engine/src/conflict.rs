//! Conflict detection against stored events.
//!
//! Scans the non-cancelled events on one calendar date for a time overlap
//! with a candidate slot. This is the fast-path pre-check that produces good
//! error messages; the store's exclusion constraint remains the
//! authoritative guard against concurrent writers.

use std::time::Duration;

use chrono::NaiveDate;
use tracing::trace;

use planwise_core::{EventId, TimeSlot};
use planwise_store::EventStore;

use crate::bounded;
use crate::error::EngineResult;

/// Checks whether `slot` collides with any non-cancelled event on `date`.
///
/// When `exclude` is given that event is ignored, so an update can be
/// re-checked against everything but itself. Read-only: no persistence side
/// effects, returns on the first match.
pub async fn has_conflict<S: EventStore>(
    store: &S,
    timeout: Duration,
    date: NaiveDate,
    slot: &TimeSlot,
    exclude: Option<EventId>,
) -> EngineResult<bool> {
    let events = bounded(timeout, store.events_on(date)).await?;
    let hit = events.iter().any(|event| {
        !event.is_cancelled
            && exclude != Some(event.id)
            && event.slot.overlaps(slot)
    });
    trace!(%date, hit, scanned = events.len(), "conflict scan");
    Ok(hit)
}
