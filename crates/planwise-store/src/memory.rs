//! In-memory store implementations.
//!
//! [`MemoryStore`] keeps events, series, and users in maps behind a single
//! `RwLock`, so every write is one critical section: check-and-insert is
//! atomic and a batch of instances lands all-or-nothing. [`MemoryTokenStore`]
//! is the keyed TTL store for refresh tokens, with expiry tracked on the
//! monotonic clock.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use planwise_core::{Event, EventId, RecurringEvent, SeriesId, SeriesPatch, User, UserId};

use crate::error::{StoreError, StoreResult};
use crate::traits::{EventStore, TokenStore, UserStore};

#[derive(Debug, Default)]
struct Tables {
    events: HashMap<EventId, Event>,
    series: HashMap<SeriesId, RecurringEvent>,
    users: HashMap<UserId, User>,
}

impl Tables {
    /// Dates on which `candidate` collides with a stored non-cancelled event.
    /// Cancelled rows and the candidate's own id are ignored.
    fn overlap_dates(&self, candidate: &Event) -> Vec<NaiveDate> {
        let hit = self.events.values().any(|stored| {
            stored.id != candidate.id
                && !stored.is_cancelled
                && stored.date == candidate.date
                && stored.slot.overlaps(&candidate.slot)
        });
        if hit { vec![candidate.date] } else { Vec::new() }
    }
}

/// In-memory relational store for events, series, and users.
///
/// The exclusion constraint ("no two non-cancelled events on the same date
/// with overlapping time ranges") is enforced on every event write inside
/// the write lock, making this store the authoritative conflict guard.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a user row. Support hook for embedding and tests; user
    /// deletion is not part of the core lifecycle.
    pub async fn remove_user(&self, id: UserId) -> bool {
        self.tables.write().await.users.remove(&id).is_some()
    }
}

impl EventStore for MemoryStore {
    async fn insert_event(&self, event: Event) -> StoreResult<Event> {
        let mut tables = self.tables.write().await;
        let conflicts = tables.overlap_dates(&event);
        if !conflicts.is_empty() {
            return Err(StoreError::overlap(conflicts));
        }
        debug!(event_id = %event.id, date = %event.date, "inserted event");
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn insert_instances(&self, events: Vec<Event>) -> StoreResult<Vec<Event>> {
        let mut tables = self.tables.write().await;

        // Validate the whole batch before touching the table.
        let mut conflicts: Vec<NaiveDate> = Vec::new();
        for event in &events {
            conflicts.extend(tables.overlap_dates(event));
        }
        if !conflicts.is_empty() {
            conflicts.sort_unstable();
            conflicts.dedup();
            return Err(StoreError::overlap(conflicts));
        }

        debug!(count = events.len(), "inserted instance batch");
        for event in &events {
            tables.events.insert(event.id, event.clone());
        }
        Ok(events)
    }

    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        Ok(self.tables.read().await.events.get(&id).cloned())
    }

    async fn events_on(&self, date: NaiveDate) -> StoreResult<Vec<Event>> {
        let tables = self.tables.read().await;
        let mut events: Vec<_> = tables
            .events
            .values()
            .filter(|e| e.date == date)
            .cloned()
            .collect();
        events.sort_by_key(|e| e.slot.start);
        Ok(events)
    }

    async fn list_events(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        offset: usize,
        limit: usize,
    ) -> StoreResult<(Vec<Event>, usize)> {
        let tables = self.tables.read().await;
        let mut matches: Vec<_> = tables
            .events
            .values()
            .filter(|e| e.date >= start && e.date <= end)
            .cloned()
            .collect();
        matches.sort_by_key(|e| (e.date, e.slot.start));

        let total = matches.len();
        let page = matches.into_iter().skip(offset).take(limit).collect();
        Ok((page, total))
    }

    async fn update_event(&self, event: Event) -> StoreResult<Event> {
        let mut tables = self.tables.write().await;
        if !tables.events.contains_key(&event.id) {
            return Err(StoreError::internal(format!(
                "update of missing event {}",
                event.id
            )));
        }
        let conflicts = tables.overlap_dates(&event);
        if !conflicts.is_empty() {
            return Err(StoreError::overlap(conflicts));
        }
        trace!(event_id = %event.id, "updated event");
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn delete_event(&self, id: EventId) -> StoreResult<bool> {
        Ok(self.tables.write().await.events.remove(&id).is_some())
    }

    async fn insert_series(&self, series: RecurringEvent) -> StoreResult<RecurringEvent> {
        let mut tables = self.tables.write().await;
        debug!(series_id = %series.id, "inserted series");
        tables.series.insert(series.id, series.clone());
        Ok(series)
    }

    async fn find_series(&self, id: SeriesId) -> StoreResult<Option<RecurringEvent>> {
        Ok(self.tables.read().await.series.get(&id).cloned())
    }

    async fn update_series(&self, series: RecurringEvent) -> StoreResult<RecurringEvent> {
        let mut tables = self.tables.write().await;
        if !tables.series.contains_key(&series.id) {
            return Err(StoreError::internal(format!(
                "update of missing series {}",
                series.id
            )));
        }
        tables.series.insert(series.id, series.clone());
        Ok(series)
    }

    async fn delete_series(&self, id: SeriesId) -> StoreResult<bool> {
        Ok(self.tables.write().await.series.remove(&id).is_some())
    }

    async fn instances_of(&self, id: SeriesId) -> StoreResult<Vec<Event>> {
        let tables = self.tables.read().await;
        let mut instances: Vec<_> = tables
            .events
            .values()
            .filter(|e| e.series_id == Some(id))
            .cloned()
            .collect();
        instances.sort_by_key(|e| e.date);
        Ok(instances)
    }

    async fn patch_unmodified_instances(
        &self,
        id: SeriesId,
        from: NaiveDate,
        patch: &SeriesPatch,
    ) -> StoreResult<usize> {
        let mut tables = self.tables.write().await;
        let mut touched = 0;
        for event in tables.events.values_mut() {
            if event.series_id != Some(id) || event.is_modified || event.date < from {
                continue;
            }
            if let Some(ref title) = patch.title {
                event.title = title.clone();
            }
            if let Some(ref description) = patch.description {
                event.description = description.clone();
            }
            if let Some(start) = patch.start_time {
                event.slot.start = start;
            }
            if let Some(end) = patch.end_time {
                event.slot.end = end;
            }
            touched += 1;
        }
        debug!(series_id = %id, touched, "patched series instances");
        Ok(touched)
    }

    async fn delete_instances(&self, id: SeriesId) -> StoreResult<usize> {
        let mut tables = self.tables.write().await;
        let before = tables.events.len();
        tables.events.retain(|_, e| e.series_id != Some(id));
        let deleted = before - tables.events.len();
        debug!(series_id = %id, deleted, "deleted series instances");
        Ok(deleted)
    }
}

impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        tables.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[derive(Debug, Clone)]
struct TokenEntry {
    value: String,
    expires_at: Instant,
}

impl TokenEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory keyed store with per-entry TTL, standing in for the fast
/// refresh-token store.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    entries: RwLock<HashMap<String, TokenEntry>>,
}

impl MemoryTokenStore {
    /// Creates an empty token store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all expired entries. Returns how many were evicted.
    pub async fn evict_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, entry| {
            let keep = !entry.is_expired();
            if !keep {
                trace!(key = %key, "evicting expired token entry");
            }
            keep
        });
        before - entries.len()
    }
}

impl TokenStore for MemoryTokenStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut entries = self.entries.write().await;
        debug!(key = %key, ttl_secs = ttl.as_secs(), "stored token entry");
        entries.insert(
            key.to_string(),
            TokenEntry {
                value: value.to_string(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let removed = self.entries.write().await.remove(key).is_some();
        if removed {
            debug!(key = %key, "deleted token entry");
        }
        Ok(removed)
    }
}
