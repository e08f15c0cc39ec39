//! Core types: dates, time slots, recurrence, events, identity

pub mod event;
pub mod identity;
pub mod recurrence;
pub mod time;
pub mod tracing;

pub use event::{
    Event, EventDraft, EventId, EventPatch, ListQuery, Page, RecurringEvent, SeriesId, SeriesPatch,
    User, UserId,
};
pub use identity::Identity;
pub use recurrence::{RecurrenceKind, RecurrenceRule, DEFAULT_HORIZON_MONTHS};
pub use time::{InvalidSlot, TimeSlot};
pub use tracing::{init_tracing, TracingConfig, TracingError, TracingOutputFormat};
