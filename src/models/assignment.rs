//! Allocation output records.
//!
//! This module contains the immutable records produced by the allocator:
//! [`AssignmentEvent`] for every committed assignment, [`UncoveredSlot`]
//! for every slot left short, and the [`CoverageStats`] that reconcile them.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ContractMode, ShiftType};

/// A committed assignment of one staff member to one slot.
///
/// # Example
///
/// ```
/// use shift_allocator::models::{AssignmentEvent, ContractMode, ShiftType};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let event = AssignmentEvent {
///     date: NaiveDate::from_ymd_opt(2025, 2, 14).unwrap(),
///     unit: "UCI".to_string(),
///     shift_type: ShiftType::Night,
///     staff_id: "N007".to_string(),
///     contract_mode: ContractMode::Full,
///     hours: Decimal::from(10),
/// };
/// assert_eq!(event.year_month(), (2025, 2));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentEvent {
    /// The date worked.
    pub date: NaiveDate,
    /// The unit of the slot.
    pub unit: String,
    /// The shift type of the slot.
    pub shift_type: ShiftType,
    /// The assigned staff member.
    pub staff_id: String,
    /// The staff member's contract mode at assignment time.
    pub contract_mode: ContractMode,
    /// Hours credited for this shift.
    pub hours: Decimal,
}

impl AssignmentEvent {
    /// The (year, month) bucket this event is summarised under.
    pub fn year_month(&self) -> (i32, u32) {
        (self.date.year(), self.date.month())
    }

    /// The idempotency key used by the assignment sink.
    pub fn key(&self) -> (NaiveDate, &str, ShiftType, &str) {
        (self.date, &self.unit, self.shift_type, &self.staff_id)
    }
}

/// A slot that could not be fully staffed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UncoveredSlot {
    /// The date of the slot.
    pub date: NaiveDate,
    /// The unit of the slot.
    pub unit: String,
    /// The shift type of the slot.
    pub shift_type: ShiftType,
    /// Required headcount minus assigned headcount.
    pub shortfall: u32,
}

/// Headcount accounting for a run.
///
/// `required == assigned + shortfall` holds for every completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Sum of required headcount over all slots.
    pub required: u64,
    /// Number of assignment events emitted.
    pub assigned: u64,
    /// Sum of shortfall over all uncovered slots.
    pub shortfall: u64,
}

impl CoverageStats {
    /// Returns true if every required position was filled.
    pub fn is_fully_covered(&self) -> bool {
        self.shortfall == 0
    }

    /// Returns true if the accounting identity holds.
    pub fn is_balanced(&self) -> bool {
        self.required == self.assigned + self.shortfall
    }

    /// Fraction of required positions that were filled, in percent.
    pub fn coverage_percent(&self) -> Decimal {
        if self.required == 0 {
            return Decimal::ONE_HUNDRED;
        }
        (Decimal::from(self.assigned) * Decimal::ONE_HUNDRED / Decimal::from(self.required))
            .round_dp(2)
    }
}
