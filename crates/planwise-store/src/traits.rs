//! Storage collaborator contracts.
//!
//! All methods are async and return [`StoreResult`]; implementations map
//! their transport failures to [`StoreError::Unavailable`] or
//! [`StoreError::Internal`](crate::StoreError::Internal). Writes that would
//! violate the date/time exclusion constraint fail with
//! [`StoreError::Overlap`](crate::StoreError::Overlap).

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use planwise_core::{Event, EventId, RecurringEvent, SeriesId, SeriesPatch, User, UserId};

use crate::error::StoreResult;

/// Persistence for events and recurring-event series.
pub trait EventStore: Send + Sync {
    /// Inserts one event, enforcing the exclusion constraint against all
    /// stored non-cancelled events on the same date.
    fn insert_event(&self, event: Event) -> impl Future<Output = StoreResult<Event>> + Send;

    /// Inserts a batch of series instances atomically: either every event is
    /// stored or none is. Fails with `Overlap` listing every conflicting date.
    fn insert_instances(
        &self,
        events: Vec<Event>,
    ) -> impl Future<Output = StoreResult<Vec<Event>>> + Send;

    /// Point lookup by id.
    fn find_event(&self, id: EventId) -> impl Future<Output = StoreResult<Option<Event>>> + Send;

    /// All events on the exact calendar date, cancelled ones included.
    fn events_on(&self, date: NaiveDate)
    -> impl Future<Output = StoreResult<Vec<Event>>> + Send;

    /// Events within the date range (inclusive), ordered by date then start
    /// time, sliced by `offset`/`limit`. Also returns the total match count.
    fn list_events(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = StoreResult<(Vec<Event>, usize)>> + Send;

    /// Replaces a stored event, re-checking the exclusion constraint against
    /// every other non-cancelled event on the effective date.
    fn update_event(&self, event: Event) -> impl Future<Output = StoreResult<Event>> + Send;

    /// Deletes one event. Returns whether a row existed.
    fn delete_event(&self, id: EventId) -> impl Future<Output = StoreResult<bool>> + Send;

    /// Inserts a series parent.
    fn insert_series(
        &self,
        series: RecurringEvent,
    ) -> impl Future<Output = StoreResult<RecurringEvent>> + Send;

    /// Point lookup of a series parent.
    fn find_series(
        &self,
        id: SeriesId,
    ) -> impl Future<Output = StoreResult<Option<RecurringEvent>>> + Send;

    /// Replaces a stored series parent.
    fn update_series(
        &self,
        series: RecurringEvent,
    ) -> impl Future<Output = StoreResult<RecurringEvent>> + Send;

    /// Deletes a series parent row. Returns whether a row existed.
    fn delete_series(&self, id: SeriesId) -> impl Future<Output = StoreResult<bool>> + Send;

    /// All instances referencing the series, ordered by date.
    fn instances_of(
        &self,
        id: SeriesId,
    ) -> impl Future<Output = StoreResult<Vec<Event>>> + Send;

    /// Applies the patch to every not-individually-modified instance of the
    /// series dated `from` or later. No exclusion re-check is performed on
    /// this bulk write. Returns the number of instances touched.
    fn patch_unmodified_instances(
        &self,
        id: SeriesId,
        from: NaiveDate,
        patch: &SeriesPatch,
    ) -> impl Future<Output = StoreResult<usize>> + Send;

    /// Deletes every instance of the series. Returns the number deleted.
    fn delete_instances(&self, id: SeriesId) -> impl Future<Output = StoreResult<usize>> + Send;
}

/// Persistence for user accounts.
pub trait UserStore: Send + Sync {
    /// Inserts a user.
    fn insert_user(&self, user: User) -> impl Future<Output = StoreResult<User>> + Send;

    /// Point lookup by id.
    fn find_user(&self, id: UserId) -> impl Future<Output = StoreResult<Option<User>>> + Send;

    /// Lookup by unique email.
    fn find_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = StoreResult<Option<User>>> + Send;
}

/// Fast keyed storage with per-entry TTL, used for refresh tokens.
pub trait TokenStore: Send + Sync {
    /// Stores `value` under `key`, overwriting any prior value and resetting
    /// the TTL.
    fn set(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Fetches the value under `key`, if present and not expired.
    fn get(&self, key: &str) -> impl Future<Output = StoreResult<Option<String>>> + Send;

    /// Deletes the value under `key`. Returns whether an entry existed.
    fn delete(&self, key: &str) -> impl Future<Output = StoreResult<bool>> + Send;
}

impl<S: EventStore> EventStore for Arc<S> {
    async fn insert_event(&self, event: Event) -> StoreResult<Event> {
        (**self).insert_event(event).await
    }

    async fn insert_instances(&self, events: Vec<Event>) -> StoreResult<Vec<Event>> {
        (**self).insert_instances(events).await
    }

    async fn find_event(&self, id: EventId) -> StoreResult<Option<Event>> {
        (**self).find_event(id).await
    }

    async fn events_on(&self, date: NaiveDate) -> StoreResult<Vec<Event>> {
        (**self).events_on(date).await
    }

    async fn list_events(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        offset: usize,
        limit: usize,
    ) -> StoreResult<(Vec<Event>, usize)> {
        (**self).list_events(start, end, offset, limit).await
    }

    async fn update_event(&self, event: Event) -> StoreResult<Event> {
        (**self).update_event(event).await
    }

    async fn delete_event(&self, id: EventId) -> StoreResult<bool> {
        (**self).delete_event(id).await
    }

    async fn insert_series(&self, series: RecurringEvent) -> StoreResult<RecurringEvent> {
        (**self).insert_series(series).await
    }

    async fn find_series(&self, id: SeriesId) -> StoreResult<Option<RecurringEvent>> {
        (**self).find_series(id).await
    }

    async fn update_series(&self, series: RecurringEvent) -> StoreResult<RecurringEvent> {
        (**self).update_series(series).await
    }

    async fn delete_series(&self, id: SeriesId) -> StoreResult<bool> {
        (**self).delete_series(id).await
    }

    async fn instances_of(&self, id: SeriesId) -> StoreResult<Vec<Event>> {
        (**self).instances_of(id).await
    }

    async fn patch_unmodified_instances(
        &self,
        id: SeriesId,
        from: NaiveDate,
        patch: &SeriesPatch,
    ) -> StoreResult<usize> {
        (**self).patch_unmodified_instances(id, from, patch).await
    }

    async fn delete_instances(&self, id: SeriesId) -> StoreResult<usize> {
        (**self).delete_instances(id).await
    }
}

impl<S: UserStore> UserStore for Arc<S> {
    async fn insert_user(&self, user: User) -> StoreResult<User> {
        (**self).insert_user(user).await
    }

    async fn find_user(&self, id: UserId) -> StoreResult<Option<User>> {
        (**self).find_user(id).await
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        (**self).find_user_by_email(email).await
    }
}

impl<S: TokenStore> TokenStore for Arc<S> {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        (**self).set(key, value, ttl).await
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get(key).await
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        (**self).delete(key).await
    }
}
