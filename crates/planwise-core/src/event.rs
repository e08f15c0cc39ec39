//! Event, series, and user models.
//!
//! This module provides the persistent domain types:
//! - [`Event`]: a dated entry on the calendar, standalone or a series instance
//! - [`RecurringEvent`]: the parent row a series of instances is generated from
//! - [`User`]: an account that owns events
//!
//! plus the typed inputs consumed by the lifecycle manager ([`EventDraft`],
//! [`EventPatch`], [`SeriesPatch`], [`ListQuery`]) and the [`Page`] result
//! wrapper for range listings.

use std::fmt;

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::recurrence::RecurrenceRule;
use crate::time::TimeSlot;

macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord,
            Serialize, Deserialize,
        )]
        pub struct $name(Uuid);

        impl $name {
            /// Generates a fresh random id.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

id_type!(
    /// Identifier of a calendar event.
    EventId
);
id_type!(
    /// Identifier of a recurring-event series.
    SeriesId
);
id_type!(
    /// Identifier of a user account.
    UserId
);

/// A user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub firstname: String,
    pub lastname: String,
    /// Unique across all users.
    pub email: String,
    /// Argon2 PHC string; never the raw password.
    pub password_hash: String,
}

impl User {
    /// Creates a new user with a fresh id.
    pub fn new(
        firstname: impl Into<String>,
        lastname: impl Into<String>,
        email: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            id: UserId::new(),
            firstname: firstname.into(),
            lastname: lastname.into(),
            email: email.into(),
            password_hash: password_hash.into(),
        }
    }
}

/// A calendar event on a single date.
///
/// An event holding a [`SeriesId`] is an *instance* generated from a
/// [`RecurringEvent`]; one without is a *standalone* event. The series
/// reference identifies membership only — instance rows live and die through
/// the store like any other event, except that deleting the series cascades
/// over them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    pub description: String,
    /// Calendar date, serialized `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Occupied time range on `date`.
    pub slot: TimeSlot,
    pub author_id: UserId,
    pub created_at: NaiveDate,
    /// Cancelled events are ignored by conflict detection.
    pub is_cancelled: bool,
    /// Set when an instance is edited individually; bulk series updates
    /// skip modified instances.
    pub is_modified: bool,
    /// Present on series instances, absent on standalone events.
    pub series_id: Option<SeriesId>,
}

impl Event {
    /// Creates a standalone event owned by `author_id`.
    pub fn standalone(
        title: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
        slot: TimeSlot,
        author_id: UserId,
    ) -> Self {
        Self {
            id: EventId::new(),
            title: title.into(),
            description: description.into(),
            date,
            slot,
            author_id,
            created_at: Utc::now().date_naive(),
            is_cancelled: false,
            is_modified: false,
            series_id: None,
        }
    }

    /// Creates one instance of a series on the given date.
    pub fn instance(series: &RecurringEvent, date: NaiveDate) -> Self {
        Self {
            id: EventId::new(),
            title: series.title.clone(),
            description: series.description.clone(),
            date,
            slot: series.slot,
            author_id: series.author_id,
            created_at: Utc::now().date_naive(),
            is_cancelled: false,
            is_modified: false,
            series_id: Some(series.id),
        }
    }

    /// Returns true if this event belongs to a recurring series.
    pub fn is_instance(&self) -> bool {
        self.series_id.is_some()
    }
}

/// The parent row of a recurring series.
///
/// Owns the instances it generates: deleting the series deletes them all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringEvent {
    pub id: SeriesId,
    pub title: String,
    pub description: String,
    /// Date of the first instance, serialized `YYYY-MM-DD`.
    pub start_date: NaiveDate,
    /// Time range shared by every instance.
    pub slot: TimeSlot,
    pub author_id: UserId,
    pub created_at: NaiveDate,
    pub rule: RecurrenceRule,
}

impl RecurringEvent {
    /// Creates a new series parent owned by `author_id`.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        start_date: NaiveDate,
        slot: TimeSlot,
        rule: RecurrenceRule,
        author_id: UserId,
    ) -> Self {
        Self {
            id: SeriesId::new(),
            title: title.into(),
            description: description.into(),
            start_date,
            slot,
            author_id,
            created_at: Utc::now().date_naive(),
            rule,
        }
    }
}

/// Validated input for creating an event.
///
/// With the default rule (`none`) this creates one standalone event;
/// with a recurring rule it creates a whole series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub slot: TimeSlot,
    #[serde(default)]
    pub rule: RecurrenceRule,
}

impl EventDraft {
    /// Creates a draft for a standalone event.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
        slot: TimeSlot,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            date,
            slot,
            rule: RecurrenceRule::none(),
        }
    }

    /// Builder: attach a recurrence rule.
    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.rule = rule;
        self
    }
}

/// Partial update for a single event.
///
/// Patch semantics are explicit: an absent field means "retain the stored
/// value", never "reset to a default". An entirely empty patch is a valid
/// no-op update that still passes through the conflict re-check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl EventPatch {
    /// Builder: set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: move the event to another date.
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// Builder: set the start time.
    pub fn with_start_time(mut self, start: NaiveTime) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Builder: set the end time.
    pub fn with_end_time(mut self, end: NaiveTime) -> Self {
        self.end_time = Some(end);
        self
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.date.is_none()
            && self.start_time.is_none()
            && self.end_time.is_none()
    }
}

/// Partial update for a series parent, propagated to its unmodified
/// future-dated instances.
///
/// Same fallback semantics as [`EventPatch`]. The series start date and
/// recurrence rule are fixed at creation; only the fields shared with the
/// instances can change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
}

impl SeriesPatch {
    /// Builder: set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: set the start time.
    pub fn with_start_time(mut self, start: NaiveTime) -> Self {
        self.start_time = Some(start);
        self
    }

    /// Builder: set the end time.
    pub fn with_end_time(mut self, end: NaiveTime) -> Self {
        self.end_time = Some(end);
        self
    }
}

/// Parameters for a paged date-range listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListQuery {
    /// First date of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last date of the range (inclusive).
    pub end_date: NaiveDate,
    /// 1-based page number.
    pub page: usize,
    /// Page size.
    pub limit: usize,
}

impl ListQuery {
    /// Creates a query over the given range with the default page size.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
            page: 1,
            limit: 5,
        }
    }

    /// Builder: select a page (1-based).
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    /// Builder: set the page size.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }
}

/// One page of a listing, with the pagination metadata callers need to
/// render page controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Total matching items across all pages.
    pub total_items: usize,
    /// Total page count at the requested page size.
    pub total_pages: usize,
}

impl<T> Page<T> {
    /// Wraps one page of items, computing the page count from the total
    /// item count and page size.
    pub fn new(items: Vec<T>, total_items: usize, page_size: usize) -> Self {
        Self {
            items,
            total_items,
            total_pages: total_items.div_ceil(page_size.max(1)),
        }
    }
}
