//! Recurrence rules and series expansion.
//!
//! A [`RecurrenceRule`] describes how often a series repeats and until when.
//! [`RecurrenceRule::expand`] turns a rule plus a start date into the full,
//! ordered list of instance dates — a pure function of its inputs.

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Horizon applied when a rule has no explicit end date: two calendar years
/// past the series start.
pub const DEFAULT_HORIZON_MONTHS: u32 = 24;

/// How often a series repeats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceKind {
    /// A one-off event; never routed through the expander.
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
}

/// A fixed-interval recurrence rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrenceRule {
    /// The repetition cadence.
    pub kind: RecurrenceKind,
    /// Repeat every `interval` days/weeks/months. Always at least 1.
    pub interval: u32,
    /// Last date an instance may fall on. Absent means the default horizon.
    pub end_date: Option<NaiveDate>,
}

impl Default for RecurrenceRule {
    fn default() -> Self {
        Self::none()
    }
}

impl RecurrenceRule {
    /// Creates a rule. An interval of zero is normalized to 1.
    pub fn new(kind: RecurrenceKind, interval: u32, end_date: Option<NaiveDate>) -> Self {
        Self {
            kind,
            interval: interval.max(1),
            end_date,
        }
    }

    /// The rule for a one-off event.
    pub fn none() -> Self {
        Self {
            kind: RecurrenceKind::None,
            interval: 1,
            end_date: None,
        }
    }

    /// Returns true if this rule actually repeats.
    pub fn is_recurring(&self) -> bool {
        self.kind != RecurrenceKind::None
    }

    /// The last date an instance may fall on, for a series starting at `start`.
    ///
    /// The explicit end date wins; otherwise the horizon is `start` plus two
    /// calendar years.
    pub fn horizon(&self, start: NaiveDate) -> NaiveDate {
        self.end_date.unwrap_or_else(|| {
            start
                .checked_add_months(Months::new(DEFAULT_HORIZON_MONTHS))
                .unwrap_or(start)
        })
    }

    /// Expands the rule into the ordered list of instance dates, starting at
    /// `start` and ending at the horizon (inclusive).
    ///
    /// Monthly steps are anchored to the start date: occurrence *n* falls on
    /// `start + n * interval` months, clamped to the last valid day of the
    /// target month. Starting Jan 31 with interval 1 therefore yields Feb 29
    /// (in a leap year) and then Mar 31 — the clamp never compounds.
    ///
    /// For [`RecurrenceKind::None`] the start date alone is returned.
    pub fn expand(&self, start: NaiveDate) -> Vec<NaiveDate> {
        let horizon = self.horizon(start);
        let interval = self.interval.max(1);
        let mut dates = Vec::new();

        match self.kind {
            RecurrenceKind::None => {
                if start <= horizon {
                    dates.push(start);
                }
            }
            RecurrenceKind::Daily | RecurrenceKind::Weekly => {
                let step = if self.kind == RecurrenceKind::Weekly {
                    7 * u64::from(interval)
                } else {
                    u64::from(interval)
                };
                let mut cursor = start;
                while cursor <= horizon {
                    dates.push(cursor);
                    match cursor.checked_add_days(Days::new(step)) {
                        Some(next) => cursor = next,
                        None => break,
                    }
                }
            }
            RecurrenceKind::Monthly => {
                let mut occurrence = 0u32;
                loop {
                    let months = Months::new(occurrence.saturating_mul(interval));
                    let Some(cursor) = start.checked_add_months(months) else {
                        break;
                    };
                    if cursor > horizon {
                        break;
                    }
                    dates.push(cursor);
                    occurrence += 1;
                }
            }
        }

        dates
    }
}
