//! Shift slot model.
//!
//! A [`ShiftSlot`] is one (date, unit, shift type) staffing requirement.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ShiftType;

/// One staffing requirement consumed exactly once by the allocator.
///
/// # Example
///
/// ```
/// use shift_allocator::models::{ShiftSlot, ShiftType};
/// use chrono::NaiveDate;
///
/// let slot = ShiftSlot {
///     date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     unit: "UCI".to_string(),
///     shift_type: ShiftType::Night,
///     required: 2,
/// };
/// assert!(slot.matches_scope("UCI", ShiftType::Night));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSlot {
    /// The calendar date of the shift.
    pub date: NaiveDate,
    /// The unit requesting staff.
    pub unit: String,
    /// The shift type requested.
    pub shift_type: ShiftType,
    /// Number of people required.
    pub required: u32,
}

impl ShiftSlot {
    /// Returns true if the slot belongs to the given unit and shift type.
    pub fn matches_scope(&self, unit: &str, shift_type: ShiftType) -> bool {
        self.unit == unit && self.shift_type == shift_type
    }
}
