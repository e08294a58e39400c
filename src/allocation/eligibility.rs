//! Eligibility filter.
//!
//! Six pure checks decide whether a staff member may take a slot given the
//! work already assigned in the run. A candidate failing any check is simply
//! excluded; none of these functions can fail.

use chrono::{NaiveDate, TimeDelta};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::ContractPolicy;
use crate::models::{ShiftSlot, StaffMember};

use super::WorkState;

/// The check that excluded a candidate, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// Different unit or contracted shift type.
    OutOfScope,
    /// The slot date is one of the member's unavailable dates.
    Unavailable,
    /// The member already reached the annual shift-count ceiling.
    ShiftCeiling,
    /// The slot would extend a run of consecutive worked days past the cap.
    ConsecutiveDays,
    /// The slot is closer than the minimum rest to an already worked date.
    MinimumRest,
    /// The slot's hours would push the member over the annual hour ceiling.
    HourCeiling,
}

impl Rejection {
    /// Short description for logs and reports.
    pub fn describe(&self) -> &'static str {
        match self {
            Rejection::OutOfScope => "unit or shift type does not match",
            Rejection::Unavailable => "declared unavailable on this date",
            Rejection::ShiftCeiling => "annual shift ceiling reached",
            Rejection::ConsecutiveDays => "consecutive-day cap reached",
            Rejection::MinimumRest => "minimum rest not respected",
            Rejection::HourCeiling => "annual hour ceiling would be exceeded",
        }
    }
}

/// The member works the slot's unit and shift type.
pub fn matches_scope(slot: &ShiftSlot, member: &StaffMember) -> bool {
    slot.matches_scope(&member.unit, member.shift_type)
}

/// The slot date is not among the member's unavailable dates.
pub fn is_available(slot: &ShiftSlot, member: &StaffMember) -> bool {
    !member.is_unavailable_on(slot.date)
}

/// The member's shift count is strictly below the shift ceiling.
pub fn within_shift_ceiling(member: &StaffMember, state: &WorkState) -> bool {
    Decimal::from(state.shift_count()) < member.ceilings.shifts
}

/// Working the slot keeps every run of consecutive days within `max_days`.
///
/// ```
/// use shift_allocator::allocation::{within_consecutive_cap, WorkState};
/// use shift_allocator::models::{ShiftSlot, ShiftType};
/// use chrono::NaiveDate;
///
/// let slot = ShiftSlot {
///     date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     unit: "UCI".to_string(),
///     shift_type: ShiftType::Morning,
///     required: 1,
/// };
/// assert!(within_consecutive_cap(&slot, &WorkState::default(), 7));
/// ```
pub fn within_consecutive_cap(slot: &ShiftSlot, state: &WorkState, max_days: u32) -> bool {
    state.streak_through(slot.date) <= max_days
}

/// The slot is at least `min_rest_hours` away from every worked date.
///
/// Dates are compared as midnight timestamps, so with a 12 hour minimum
/// only a second shift on the same calendar date is rejected.
pub fn respects_minimum_rest(slot: &ShiftSlot, state: &WorkState, min_rest_hours: i64) -> bool {
    let window_days = min_rest_hours.max(0).saturating_add(23) / 24;
    let window = TimeDelta::try_days(window_days);
    let from = window
        .and_then(|days| slot.date.checked_sub_signed(days))
        .unwrap_or(NaiveDate::MIN);
    let to = window
        .and_then(|days| slot.date.checked_add_signed(days))
        .unwrap_or(NaiveDate::MAX);

    state
        .worked_dates()
        .range(from..=to)
        .all(|worked| (slot.date - *worked).num_hours().abs() >= min_rest_hours)
}

/// Adding `shift_hours` keeps the member at or below the hour ceiling.
pub fn within_hour_ceiling(member: &StaffMember, state: &WorkState, shift_hours: Decimal) -> bool {
    state.hours() + shift_hours <= member.ceilings.hours
}

/// Runs every check in order and reports the first one that fails.
///
/// # Example
///
/// ```
/// use shift_allocator::allocation::{evaluate, Rejection, WorkState};
/// use shift_allocator::config::ContractPolicy;
/// use shift_allocator::models::{ContractMode, ShiftSlot, ShiftType, StaffMember};
/// use chrono::NaiveDate;
///
/// let policy = ContractPolicy::default();
/// let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
/// let member = StaffMember {
///     id: "N001".to_string(),
///     unit: "UCI".to_string(),
///     shift_type: ShiftType::Night,
///     contract_mode: ContractMode::Full,
///     unavailable: [date].into_iter().collect(),
///     ceilings: policy.ceilings(ShiftType::Night, ContractMode::Full),
/// };
/// let slot = ShiftSlot { date, unit: "UCI".to_string(), shift_type: ShiftType::Night, required: 1 };
///
/// assert_eq!(
///     evaluate(&slot, &member, &WorkState::default(), &policy),
///     Err(Rejection::Unavailable)
/// );
/// ```
pub fn evaluate(
    slot: &ShiftSlot,
    member: &StaffMember,
    state: &WorkState,
    policy: &ContractPolicy,
) -> Result<(), Rejection> {
    if !matches_scope(slot, member) {
        return Err(Rejection::OutOfScope);
    }
    if !is_available(slot, member) {
        return Err(Rejection::Unavailable);
    }
    if !within_shift_ceiling(member, state) {
        return Err(Rejection::ShiftCeiling);
    }
    if !within_consecutive_cap(slot, state, policy.max_consecutive_days) {
        return Err(Rejection::ConsecutiveDays);
    }
    if !respects_minimum_rest(slot, state, policy.min_rest_hours) {
        return Err(Rejection::MinimumRest);
    }
    if !within_hour_ceiling(member, state, policy.shift_hours(slot.shift_type)) {
        return Err(Rejection::HourCeiling);
    }
    Ok(())
}

/// Returns true if every check passes.
pub fn is_eligible(
    slot: &ShiftSlot,
    member: &StaffMember,
    state: &WorkState,
    policy: &ContractPolicy,
) -> bool {
    evaluate(slot, member, state, policy).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ceilings, ContractMode, ShiftType};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn member(shift_type: ShiftType) -> StaffMember {
        StaffMember {
            id: "N001".to_string(),
            unit: "UCI".to_string(),
            shift_type,
            contract_mode: ContractMode::Full,
            unavailable: Default::default(),
            ceilings: ContractPolicy::default().ceilings(shift_type, ContractMode::Full),
        }
    }

    fn slot(day: &str, shift_type: ShiftType) -> ShiftSlot {
        ShiftSlot {
            date: date(day),
            unit: "UCI".to_string(),
            shift_type,
            required: 1,
        }
    }

    fn worked(days: &[&str], hours_each: &str) -> WorkState {
        let mut state = WorkState::default();
        for day in days {
            state.record(date(day), dec(hours_each));
        }
        state
    }

    // ==========================================================================
    // Scope
    // ==========================================================================

    #[test]
    fn test_scope_requires_same_unit_and_shift() {
        let morning = member(ShiftType::Morning);
        assert!(matches_scope(&slot("2025-01-01", ShiftType::Morning), &morning));
        assert!(!matches_scope(&slot("2025-01-01", ShiftType::Night), &morning));

        let mut other_unit = slot("2025-01-01", ShiftType::Morning);
        other_unit.unit = "Urgencias".to_string();
        assert!(!matches_scope(&other_unit, &morning));
    }

    // ==========================================================================
    // Availability
    // ==========================================================================

    #[test]
    fn test_unavailable_date_is_rejected() {
        let mut nurse = member(ShiftType::Morning);
        nurse.unavailable.insert(date("2025-01-02"));

        assert!(!is_available(&slot("2025-01-02", ShiftType::Morning), &nurse));
        assert!(is_available(&slot("2025-01-03", ShiftType::Morning), &nurse));
    }

    // ==========================================================================
    // Shift-count ceiling
    // ==========================================================================

    #[test]
    fn test_shift_ceiling_is_strict() {
        let mut nurse = member(ShiftType::Morning);
        nurse.ceilings = Ceilings {
            hours: dec("1000"),
            shifts: dec("2"),
        };

        assert!(within_shift_ceiling(&nurse, &worked(&["2025-01-01"], "7.5")));
        assert!(!within_shift_ceiling(
            &nurse,
            &worked(&["2025-01-01", "2025-01-02"], "7.5")
        ));
    }

    #[test]
    fn test_fractional_shift_ceiling_allows_floor() {
        let mut nurse = member(ShiftType::Morning);
        nurse.ceilings.shifts = dec("2.4");

        assert!(within_shift_ceiling(
            &nurse,
            &worked(&["2025-01-01", "2025-01-02"], "7.5")
        ));
        assert!(!within_shift_ceiling(
            &nurse,
            &worked(&["2025-01-01", "2025-01-02", "2025-01-03"], "7.5")
        ));
    }

    // ==========================================================================
    // Consecutive-day cap
    // ==========================================================================

    #[test]
    fn test_seventh_consecutive_day_is_allowed() {
        let state = worked(
            &[
                "2025-01-01",
                "2025-01-02",
                "2025-01-03",
                "2025-01-04",
                "2025-01-05",
                "2025-01-06",
            ],
            "7.5",
        );
        assert!(within_consecutive_cap(&slot("2025-01-07", ShiftType::Morning), &state, 7));
    }

    #[test]
    fn test_eighth_consecutive_day_is_rejected() {
        let state = worked(
            &[
                "2025-01-01",
                "2025-01-02",
                "2025-01-03",
                "2025-01-04",
                "2025-01-05",
                "2025-01-06",
                "2025-01-07",
            ],
            "7.5",
        );
        assert!(!within_consecutive_cap(&slot("2025-01-08", ShiftType::Morning), &state, 7));
    }

    #[test]
    fn test_gap_resets_streak() {
        let state = worked(
            &[
                "2025-01-01",
                "2025-01-02",
                "2025-01-03",
                "2025-01-04",
                "2025-01-05",
                "2025-01-06",
                "2025-01-07",
            ],
            "7.5",
        );
        assert!(within_consecutive_cap(&slot("2025-01-09", ShiftType::Morning), &state, 7));
    }

    #[test]
    fn test_custom_cap() {
        let state = worked(&["2025-01-01", "2025-01-02"], "7.5");
        assert!(!within_consecutive_cap(&slot("2025-01-03", ShiftType::Morning), &state, 2));
        assert!(within_consecutive_cap(&slot("2025-01-03", ShiftType::Morning), &state, 3));
    }

    // ==========================================================================
    // Minimum rest
    // ==========================================================================

    #[test]
    fn test_same_day_is_rejected_by_rest_rule() {
        let state = worked(&["2025-01-01"], "7.5");
        assert!(!respects_minimum_rest(&slot("2025-01-01", ShiftType::Morning), &state, 12));
    }

    #[test]
    fn test_adjacent_day_passes_twelve_hour_rule() {
        let state = worked(&["2025-01-01"], "10");
        assert!(respects_minimum_rest(&slot("2025-01-02", ShiftType::Night), &state, 12));
        assert!(respects_minimum_rest(&slot("2024-12-31", ShiftType::Night), &state, 12));
    }

    #[test]
    fn test_longer_rest_rejects_adjacent_day() {
        let state = worked(&["2025-01-01"], "10");
        assert!(!respects_minimum_rest(&slot("2025-01-02", ShiftType::Night), &state, 36));
        assert!(respects_minimum_rest(&slot("2025-01-03", ShiftType::Night), &state, 36));
    }

    #[test]
    fn test_extreme_rest_window_is_clamped() {
        let state = worked(&["2025-01-01"], "10");
        let far = slot("2030-06-01", ShiftType::Night);
        assert!(!respects_minimum_rest(&far, &state, i64::MAX));
        assert!(respects_minimum_rest(&far, &WorkState::default(), i64::MAX));
    }

    #[test]
    fn test_rest_window_at_calendar_edge() {
        let mut edge = slot("2025-01-01", ShiftType::Night);
        edge.date = NaiveDate::MAX;
        let state = worked(&["2025-01-01"], "10");
        assert!(respects_minimum_rest(&edge, &state, 48));

        edge.date = NaiveDate::MIN;
        assert!(respects_minimum_rest(&edge, &state, 48));
    }

    // ==========================================================================
    // Hour ceiling
    // ==========================================================================

    #[test]
    fn test_hour_ceiling_is_inclusive() {
        let mut nurse = member(ShiftType::Morning);
        nurse.ceilings.hours = dec("15");

        assert!(within_hour_ceiling(&nurse, &worked(&["2025-01-01"], "7.5"), dec("7.5")));
        assert!(!within_hour_ceiling(
            &nurse,
            &worked(&["2025-01-01", "2025-01-02"], "7.5"),
            dec("7.5")
        ));
    }

    // ==========================================================================
    // Composite evaluation
    // ==========================================================================

    #[test]
    fn test_evaluate_passes_fresh_candidate() {
        let policy = ContractPolicy::default();
        let nurse = member(ShiftType::Afternoon);
        assert_eq!(
            evaluate(&slot("2025-01-01", ShiftType::Afternoon), &nurse, &WorkState::default(), &policy),
            Ok(())
        );
        assert!(is_eligible(
            &slot("2025-01-01", ShiftType::Afternoon),
            &nurse,
            &WorkState::default(),
            &policy
        ));
    }

    #[test]
    fn test_evaluate_reports_first_failing_check() {
        let policy = ContractPolicy::default();
        let mut nurse = member(ShiftType::Morning);
        nurse.unavailable.insert(date("2025-01-01"));

        // Out of scope wins over unavailability.
        assert_eq!(
            evaluate(&slot("2025-01-01", ShiftType::Night), &nurse, &WorkState::default(), &policy),
            Err(Rejection::OutOfScope)
        );
        assert_eq!(
            evaluate(&slot("2025-01-01", ShiftType::Morning), &nurse, &WorkState::default(), &policy),
            Err(Rejection::Unavailable)
        );

        let state = worked(&["2025-01-02"], "7.5");
        assert_eq!(
            evaluate(&slot("2025-01-02", ShiftType::Morning), &nurse, &state, &policy),
            Err(Rejection::MinimumRest)
        );
    }

    #[test]
    fn test_evaluate_hour_ceiling_for_night_shift() {
        let policy = ContractPolicy::default();
        let mut nurse = member(ShiftType::Night);
        nurse.ceilings.hours = dec("15");

        let state = worked(&["2025-01-01"], "10");
        assert_eq!(
            evaluate(&slot("2025-01-03", ShiftType::Night), &nurse, &state, &policy),
            Err(Rejection::HourCeiling)
        );
    }

    #[test]
    fn test_rejection_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&Rejection::ConsecutiveDays).unwrap(),
            "\"consecutive_days\""
        );
        assert!(Rejection::HourCeiling.describe().contains("hour ceiling"));
    }
}
