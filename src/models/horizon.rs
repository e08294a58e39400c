//! Planning horizon model.
//!
//! This module contains the [`PlanningHorizon`] type, the inclusive date
//! range over which demand is synthesised from a weekly pattern.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// An inclusive, non-empty range of planning dates.
///
/// # Example
///
/// ```
/// use shift_allocator::models::PlanningHorizon;
/// use chrono::NaiveDate;
///
/// let horizon = PlanningHorizon::new(
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     NaiveDate::from_ymd_opt(2025, 1, 7).unwrap(),
/// ).unwrap();
///
/// assert_eq!(horizon.len(), 7);
/// assert!(horizon.contains(NaiveDate::from_ymd_opt(2025, 1, 4).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanningHorizon {
    start: NaiveDate,
    end: NaiveDate,
}

impl PlanningHorizon {
    /// Creates a horizon, rejecting ranges where `end <= start`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        if end <= start {
            return Err(EngineError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The first planned day.
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// The last planned day.
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the horizon, both ends included.
    pub fn len(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    /// Always false; a horizon spans at least two days.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Checks if a date falls within the horizon (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Iterates every date of the horizon in ascending order.
    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.start.iter_days().take_while(move |date| *date <= self.end)
    }
}

/// Timestamp layouts accepted after the date, as spreadsheet exports write them.
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parses a table date cell.
///
/// Accepts `YYYY-MM-DD`, optionally followed by a time of day; any other
/// trailing text is rejected rather than cut off.
///
/// ```
/// use shift_allocator::models::parse_day;
/// use chrono::NaiveDate;
///
/// let day = NaiveDate::from_ymd_opt(2025, 1, 11).unwrap();
/// assert_eq!(parse_day("2025-01-11"), Some(day));
/// assert_eq!(parse_day("2025-01-11 00:00:00"), Some(day));
/// assert_eq!(parse_day("2025-01-011"), None);
/// ```
pub fn parse_day(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok().or_else(|| {
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .map(|timestamp| timestamp.date())
    })
}
