//! Event lifecycle orchestration.
//!
//! [`EventManager`] implements the create/update/delete operations for
//! standalone events and recurring series. It owns the ordering rules the
//! store cannot express on its own: pre-checking candidate slots, expanding
//! recurrence rules, committing a series all-or-nothing, and compensating
//! with deletes when a mid-flight step fails.

use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use planwise_core::{
    Event, EventDraft, EventId, EventPatch, Identity, ListQuery, Page, RecurringEvent, SeriesId,
    SeriesPatch, TimeSlot,
};
use planwise_store::{EventStore, StoreResult};

use crate::conflict::has_conflict;
use crate::error::{EngineError, EngineResult};
use crate::{EngineConfig, bounded};

/// Result of a create operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreatedEvent {
    /// One standalone event was created.
    Single(Event),
    /// A whole series was created: the parent and every generated instance.
    Series {
        series: RecurringEvent,
        instances: Vec<Event>,
    },
}

/// Orchestrates the event lifecycle over an injected store handle.
///
/// Ownership rule: every mutating operation compares the stored author id
/// against the acting caller; a mismatch yields the same `NotFound` as a
/// genuinely absent row, so non-owners cannot probe for existence.
#[derive(Debug)]
pub struct EventManager<S> {
    store: S,
    config: EngineConfig,
}

impl<S: EventStore> EventManager<S> {
    /// Creates a manager with default configuration.
    pub fn new(store: S) -> Self {
        Self::with_config(store, EngineConfig::default())
    }

    /// Creates a manager with the given configuration.
    pub fn with_config(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    async fn store_call<T>(&self, fut: impl Future<Output = StoreResult<T>>) -> EngineResult<T> {
        bounded(self.config.store_timeout, fut).await
    }

    /// Creates a standalone event or a whole recurring series, depending on
    /// the draft's recurrence rule.
    ///
    /// Standalone: the requested slot is pre-checked for conflicts and the
    /// event persisted. Recurring: the parent row is persisted first, the
    /// rule expanded, and every instance date checked; any conflict rolls
    /// the parent back and reports all conflicting dates. Partial series are
    /// never left behind — the compensating deletes run no matter which
    /// downstream step failed.
    pub async fn create_event(
        &self,
        actor: &Identity,
        draft: EventDraft,
    ) -> EngineResult<CreatedEvent>
    where
        S: Clone + 'static,
    {
        if !draft.rule.is_recurring() {
            if has_conflict(
                &self.store,
                self.config.store_timeout,
                draft.date,
                &draft.slot,
                None,
            )
            .await?
            {
                return Err(EngineError::conflict(vec![draft.date]));
            }

            let event = Event::standalone(
                draft.title,
                draft.description,
                draft.date,
                draft.slot,
                actor.user_id,
            );
            let event = self.store_call(self.store.insert_event(event)).await?;
            info!(event_id = %event.id, date = %event.date, "created event");
            return Ok(CreatedEvent::Single(event));
        }

        let series = RecurringEvent::new(
            draft.title,
            draft.description,
            draft.date,
            draft.slot,
            draft.rule,
            actor.user_id,
        );
        let series = self.store_call(self.store.insert_series(series)).await?;
        // Armed from the moment the parent is committed until the instances
        // land, so a dropped creation future still rolls the parent back.
        let mut guard =
            SeriesRollback::arm(self.store.clone(), series.id, self.config.store_timeout);

        match self.materialize_series(&series).await {
            Ok(instances) => {
                guard.disarm();
                info!(
                    series_id = %series.id,
                    instances = instances.len(),
                    "created recurring series"
                );
                Ok(CreatedEvent::Series { series, instances })
            }
            Err(err) => {
                guard.disarm();
                rollback_series(&self.store, self.config.store_timeout, series.id).await;
                Err(err)
            }
        }
    }

    /// Expands the series and bulk-inserts its instances. Fails with every
    /// conflicting date if any candidate slot is taken.
    async fn materialize_series(&self, series: &RecurringEvent) -> EngineResult<Vec<Event>> {
        let dates = series.rule.expand(series.start_date);
        if dates.is_empty() {
            return Err(EngineError::validation(
                "recurrence rule produces no instances",
            ));
        }

        let mut conflicts = Vec::new();
        for date in &dates {
            if has_conflict(
                &self.store,
                self.config.store_timeout,
                *date,
                &series.slot,
                None,
            )
            .await?
            {
                conflicts.push(*date);
            }
        }
        if !conflicts.is_empty() {
            return Err(EngineError::conflict(conflicts));
        }

        let instances = dates
            .into_iter()
            .map(|date| Event::instance(series, date))
            .collect();
        self.store_call(self.store.insert_instances(instances)).await
    }

    /// Updates one event (standalone or instance) with patch semantics:
    /// absent fields retain their stored values, so an empty patch is a
    /// valid no-op that still passes the conflict re-check. The effective
    /// date/slot is re-checked against everything except the event itself.
    /// Editing a series instance marks it modified, which exempts it from
    /// later bulk series updates.
    pub async fn update_event(
        &self,
        actor: &Identity,
        id: EventId,
        patch: EventPatch,
    ) -> EngineResult<Event> {
        let stored = self
            .store_call(self.store.find_event(id))
            .await?
            .filter(|event| event.author_id == actor.user_id)
            .ok_or_else(|| EngineError::not_found("event"))?;

        let date = patch.date.unwrap_or(stored.date);
        let slot = TimeSlot::new(
            patch.start_time.unwrap_or(stored.slot.start),
            patch.end_time.unwrap_or(stored.slot.end),
        )
        .map_err(|err| EngineError::validation(err.to_string()))?;

        if has_conflict(
            &self.store,
            self.config.store_timeout,
            date,
            &slot,
            Some(id),
        )
        .await?
        {
            return Err(EngineError::conflict(vec![date]));
        }

        let mut updated = stored;
        if let Some(title) = patch.title {
            updated.title = title;
        }
        if let Some(description) = patch.description {
            updated.description = description;
        }
        updated.date = date;
        updated.slot = slot;
        if updated.is_instance() {
            updated.is_modified = true;
        }

        let updated = self.store_call(self.store.update_event(updated)).await?;
        debug!(event_id = %updated.id, "updated event");
        Ok(updated)
    }

    /// Updates a series parent and propagates the patch to its instances.
    ///
    /// Only instances that are dated `today` or later and have not been
    /// individually modified are touched; the rest keep their state. The
    /// bulk propagation performs no conflict re-check — the patched fields
    /// are validated at series level only, an accepted limitation.
    pub async fn update_series(
        &self,
        actor: &Identity,
        id: SeriesId,
        patch: SeriesPatch,
        today: NaiveDate,
    ) -> EngineResult<RecurringEvent> {
        let stored = self
            .store_call(self.store.find_series(id))
            .await?
            .filter(|series| series.author_id == actor.user_id)
            .ok_or_else(|| EngineError::not_found("series"))?;

        let slot = TimeSlot::new(
            patch.start_time.unwrap_or(stored.slot.start),
            patch.end_time.unwrap_or(stored.slot.end),
        )
        .map_err(|err| EngineError::validation(err.to_string()))?;

        let mut updated = stored;
        if let Some(ref title) = patch.title {
            updated.title = title.clone();
        }
        if let Some(ref description) = patch.description {
            updated.description = description.clone();
        }
        updated.slot = slot;

        let updated = self.store_call(self.store.update_series(updated)).await?;
        let touched = self
            .store_call(self.store.patch_unmodified_instances(id, today, &patch))
            .await?;
        info!(series_id = %id, touched, "updated series");
        Ok(updated)
    }

    /// Owner-scoped hard delete of one event.
    pub async fn delete_event(&self, actor: &Identity, id: EventId) -> EngineResult<()> {
        self.store_call(self.store.find_event(id))
            .await?
            .filter(|event| event.author_id == actor.user_id)
            .ok_or_else(|| EngineError::not_found("event"))?;

        self.store_call(self.store.delete_event(id)).await?;
        info!(event_id = %id, "deleted event");
        Ok(())
    }

    /// Owner-scoped hard delete of a whole series: every instance first,
    /// then the parent row.
    pub async fn delete_series(&self, actor: &Identity, id: SeriesId) -> EngineResult<()> {
        self.store_call(self.store.find_series(id))
            .await?
            .filter(|series| series.author_id == actor.user_id)
            .ok_or_else(|| EngineError::not_found("series"))?;

        let deleted = self.store_call(self.store.delete_instances(id)).await?;
        self.store_call(self.store.delete_series(id)).await?;
        info!(series_id = %id, instances = deleted, "deleted series");
        Ok(())
    }

    /// Paged date-range listing, ordered by date then start time, with the
    /// total item and page counts callers need for pagination.
    pub async fn list_events(&self, query: ListQuery) -> EngineResult<Page<Event>> {
        let limit = query.limit.max(1);
        let offset = query.page.saturating_sub(1).saturating_mul(limit);
        let (items, total) = self
            .store_call(
                self.store
                    .list_events(query.start_date, query.end_date, offset, limit),
            )
            .await?;
        Ok(Page::new(items, total, limit))
    }
}

/// Drop guard armed between the parent insert and the instance commit of a
/// recurring creation. Dropping the creation future while armed spawns the
/// compensating deletes, so a cancelled caller cannot leave an orphan
/// parent observable.
struct SeriesRollback<S: EventStore + 'static> {
    store: Option<S>,
    series_id: SeriesId,
    timeout: Duration,
}

impl<S: EventStore + 'static> SeriesRollback<S> {
    fn arm(store: S, series_id: SeriesId, timeout: Duration) -> Self {
        Self {
            store: Some(store),
            series_id,
            timeout,
        }
    }

    fn disarm(&mut self) {
        self.store = None;
    }
}

impl<S: EventStore + 'static> Drop for SeriesRollback<S> {
    fn drop(&mut self) {
        let Some(store) = self.store.take() else {
            return;
        };
        let series_id = self.series_id;
        let timeout = self.timeout;
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(series_id = %series_id, "no runtime to roll back cancelled series creation");
            return;
        };
        handle.spawn(async move {
            warn!(series_id = %series_id, "series creation cancelled, rolling back");
            rollback_series(&store, timeout, series_id).await;
        });
    }
}

/// Compensating deletes for a failed series creation: instances first, then
/// the parent. Failures here are logged, not propagated; the caller sees
/// the original error.
async fn rollback_series<S: EventStore>(store: &S, timeout: Duration, id: SeriesId) {
    if let Err(err) = bounded(timeout, store.delete_instances(id)).await {
        warn!(series_id = %id, error = %err, "series rollback: instance delete failed");
    }
    match bounded(timeout, store.delete_series(id)).await {
        Ok(_) => debug!(series_id = %id, "rolled back series parent"),
        Err(err) => {
            warn!(series_id = %id, error = %err, "series rollback: parent delete failed");
        }
    }
}
