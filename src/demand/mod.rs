//! Demand stream.
//!
//! Produces the date-ordered sequence of [`ShiftSlot`]s the allocator
//! consumes, either synthesised from a [`WeeklyPattern`] over a planning
//! horizon or validated from externally supplied rows. Ordering is always
//! ascending by date; slots sharing a date keep their input order.

mod pattern;
mod record;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::models::{PlanningHorizon, ShiftSlot, ShiftType, parse_day};

pub use pattern::{DayDemand, WeeklyPattern};
pub use record::{
    COLUMN_DATE, COLUMN_REQUIRED, COLUMN_SHIFT, COLUMN_UNIT, DemandRecord, Headcount,
    REQUIRED_COLUMNS,
};

const TABLE: &str = "demand";

/// A date-ordered, validated sequence of shift slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandStream {
    slots: Vec<ShiftSlot>,
}

impl DemandStream {
    /// Synthesises one slot per date and shift type of the horizon.
    ///
    /// Slots of a day are emitted morning, afternoon, night. Zero-headcount
    /// slots are kept so the stream mirrors the pattern exactly.
    ///
    /// # Example
    ///
    /// ```
    /// use shift_allocator::demand::{DemandStream, WeeklyPattern};
    /// use shift_allocator::models::PlanningHorizon;
    /// use chrono::NaiveDate;
    ///
    /// let horizon = PlanningHorizon::new(
    ///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    ///     NaiveDate::from_ymd_opt(2025, 1, 7).unwrap(),
    /// ).unwrap();
    ///
    /// let demand = DemandStream::generate("UCI", &horizon, &WeeklyPattern::uniform(2));
    /// assert_eq!(demand.len(), 21);
    /// assert_eq!(demand.total_required(), 42);
    /// ```
    pub fn generate(unit: &str, horizon: &PlanningHorizon, pattern: &WeeklyPattern) -> Self {
        let slots: Vec<ShiftSlot> = horizon
            .dates()
            .flat_map(|date| {
                ShiftType::ALL.into_iter().map(move |shift_type| ShiftSlot {
                    date,
                    unit: unit.to_string(),
                    shift_type,
                    required: pattern.required(date.weekday(), shift_type),
                })
            })
            .collect();

        debug!(
            unit,
            start = %horizon.start(),
            end = %horizon.end(),
            slots = slots.len(),
            "Demand generated from weekly pattern"
        );
        Self { slots }
    }

    /// Synthesises demand for an inclusive date range.
    ///
    /// Returns `InvalidDateRange` if `end <= start`.
    pub fn generate_range(
        unit: &str,
        start: NaiveDate,
        end: NaiveDate,
        pattern: &WeeklyPattern,
    ) -> EngineResult<Self> {
        let horizon = PlanningHorizon::new(start, end)?;
        Ok(Self::generate(unit, &horizon, pattern))
    }

    /// Validates externally supplied rows and sorts them by date.
    ///
    /// # Errors
    ///
    /// - `MissingField` when a row lacks a date, unit, shift or headcount
    /// - `InvalidField` for an unparseable date, unknown shift label or a
    ///   headcount that is not a non-negative whole number
    pub fn from_records(records: Vec<DemandRecord>) -> EngineResult<Self> {
        let slots = records
            .into_iter()
            .enumerate()
            .map(|(row, record)| validate_record(row, record))
            .collect::<EngineResult<Vec<_>>>()?;
        Ok(Self::from_slots(slots))
    }

    /// Wraps already typed slots, sorting them by date.
    ///
    /// The sort is stable: slots sharing a date keep their relative order.
    pub fn from_slots(mut slots: Vec<ShiftSlot>) -> Self {
        slots.sort_by_key(|slot| slot.date);
        Self { slots }
    }

    /// The slots in allocation order.
    pub fn slots(&self) -> &[ShiftSlot] {
        &self.slots
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if there are no slots.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Sum of required headcount over all slots.
    pub fn total_required(&self) -> u64 {
        self.slots.iter().map(|slot| u64::from(slot.required)).sum()
    }

    /// Consumes the stream, returning its slots.
    pub fn into_slots(self) -> Vec<ShiftSlot> {
        self.slots
    }
}

fn validate_record(row: usize, record: DemandRecord) -> EngineResult<ShiftSlot> {
    let date_text = required(row, COLUMN_DATE, record.date)?;
    let date = parse_day(&date_text)
        .ok_or_else(|| invalid(row, COLUMN_DATE, &date_text, "expected YYYY-MM-DD"))?;

    let unit = required(row, COLUMN_UNIT, record.unit)?;

    let shift_text = required(row, COLUMN_SHIFT, record.shift_type)?;
    let shift_type: ShiftType = shift_text
        .parse()
        .map_err(|message: String| invalid(row, COLUMN_SHIFT, &shift_text, &message))?;

    let headcount = record.required.ok_or_else(|| EngineError::MissingField {
        table: TABLE.to_string(),
        row,
        field: COLUMN_REQUIRED.to_string(),
    })?;
    let required = headcount.to_count().ok_or_else(|| {
        invalid(
            row,
            COLUMN_REQUIRED,
            &headcount.raw(),
            "expected a non-negative whole number",
        )
    })?;

    Ok(ShiftSlot {
        date,
        unit,
        shift_type,
        required,
    })
}

fn required(row: usize, field: &str, value: Option<String>) -> EngineResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EngineError::MissingField {
            table: TABLE.to_string(),
            row,
            field: field.to_string(),
        })
}

fn invalid(row: usize, field: &str, value: &str, message: &str) -> EngineError {
    EngineError::InvalidField {
        table: TABLE.to_string(),
        row,
        field: field.to_string(),
        value: value.to_string(),
        message: message.to_string(),
    }
}
