//! Clock-time slots for calendar events.
//!
//! This module provides [`TimeSlot`], the half-open `[start, end)` time range
//! an event occupies on a single calendar date, and the overlap rule used for
//! conflict detection.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a slot's start time is not strictly before its end time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("start time {start} is not before end time {end}")]
pub struct InvalidSlot {
    /// The rejected start time.
    pub start: NaiveTime,
    /// The rejected end time.
    pub end: NaiveTime,
}

/// A half-open time range `[start, end)` on a single calendar date.
///
/// Times serialize as `HH:MM:SS`. The `start < end` invariant is enforced at
/// construction; zero-length and inverted slots are rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Start of the slot (inclusive).
    pub start: NaiveTime,
    /// End of the slot (exclusive).
    pub end: NaiveTime,
}

impl TimeSlot {
    /// Creates a new time slot.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSlot`] unless `start < end`.
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, InvalidSlot> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(InvalidSlot { start, end })
        }
    }

    /// Checks whether two slots on the same date overlap.
    ///
    /// Half-open semantics: two ranges overlap iff
    /// `a.start < b.end && b.start < a.end`. A slot ending exactly when the
    /// other starts does NOT overlap.
    pub fn overlaps(&self, other: &TimeSlot) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Returns the slot length in whole minutes.
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn slot(sh: u32, sm: u32, eh: u32, em: u32) -> TimeSlot {
        TimeSlot::new(hm(sh, sm), hm(eh, em)).unwrap()
    }

    #[test]
    fn construction_enforces_ordering() {
        assert!(TimeSlot::new(hm(9, 0), hm(10, 0)).is_ok());
        assert!(TimeSlot::new(hm(10, 0), hm(9, 0)).is_err());
        // Zero-length slots are rejected too.
        assert!(TimeSlot::new(hm(9, 0), hm(9, 0)).is_err());
    }

    #[test]
    fn touching_boundaries_do_not_overlap() {
        let a = slot(9, 0, 10, 0);
        let b = slot(10, 0, 11, 0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn contained_slot_overlaps() {
        let a = slot(9, 0, 10, 0);
        let b = slot(9, 30, 9, 45);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn partial_overlap_is_symmetric() {
        let a = slot(9, 0, 10, 0);
        let b = slot(9, 30, 10, 30);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }

    #[test]
    fn disjoint_slots_do_not_overlap() {
        let a = slot(9, 0, 10, 0);
        let b = slot(11, 0, 12, 0);
        assert!(!a.overlaps(&b));
        assert!(!b.overlaps(&a));
    }

    #[test]
    fn identical_slots_overlap() {
        let a = slot(9, 0, 10, 0);
        assert!(a.overlaps(&a));
    }

    #[test]
    fn duration() {
        assert_eq!(slot(9, 0, 10, 30).duration_minutes(), 90);
    }

    #[test]
    fn serde_encoding_is_hms() {
        let s = slot(9, 0, 17, 30);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, r#"{"start":"09:00:00","end":"17:30:00"}"#);
        let parsed: TimeSlot = serde_json::from_str(&json).unwrap();
        assert_eq!(s, parsed);
    }
}
