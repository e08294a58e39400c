//! Per-person work state accumulated during a run.

use std::collections::{BTreeSet, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::AssignmentEvent;

/// Hours, worked dates and shift count of one staff member.
///
/// Values only grow during a run; the allocator is the only writer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkState {
    hours: Decimal,
    worked_dates: BTreeSet<NaiveDate>,
    shift_count: u32,
}

impl WorkState {
    /// Cumulative hours assigned so far.
    pub fn hours(&self) -> Decimal {
        self.hours
    }

    /// Number of shifts assigned so far.
    pub fn shift_count(&self) -> u32 {
        self.shift_count
    }

    /// Dates already worked.
    pub fn worked_dates(&self) -> &BTreeSet<NaiveDate> {
        &self.worked_dates
    }

    /// Returns true if `date` is already worked.
    pub fn has_worked(&self, date: NaiveDate) -> bool {
        self.worked_dates.contains(&date)
    }

    /// Length of the run of consecutive worked days that would contain
    /// `date` if it were worked, `date` included.
    ///
    /// Walks backward day by day from `date`, then forward, stopping at the
    /// first gap in each direction.
    pub fn streak_through(&self, date: NaiveDate) -> u32 {
        let mut streak = 1;

        let mut cursor = date.pred_opt();
        while let Some(day) = cursor.filter(|day| self.has_worked(*day)) {
            streak += 1;
            cursor = day.pred_opt();
        }

        let mut cursor = date.succ_opt();
        while let Some(day) = cursor.filter(|day| self.has_worked(*day)) {
            streak += 1;
            cursor = day.succ_opt();
        }

        streak
    }

    pub(crate) fn record(&mut self, date: NaiveDate, hours: Decimal) {
        self.hours += hours;
        self.worked_dates.insert(date);
        self.shift_count += 1;
    }
}

/// Work states of every staff member for one run, keyed by staff ID.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkLedger {
    states: HashMap<String, WorkState>,
}

impl WorkLedger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a ledger from previously committed assignments.
    ///
    /// ```
    /// use shift_allocator::allocation::WorkLedger;
    /// use shift_allocator::models::{AssignmentEvent, ContractMode, ShiftType};
    /// use chrono::NaiveDate;
    /// use rust_decimal::Decimal;
    ///
    /// let event = AssignmentEvent {
    ///     date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
    ///     unit: "UCI".to_string(),
    ///     shift_type: ShiftType::Night,
    ///     staff_id: "N001".to_string(),
    ///     contract_mode: ContractMode::Full,
    ///     hours: Decimal::from(10),
    /// };
    ///
    /// let ledger = WorkLedger::from_events(&[event]);
    /// assert_eq!(ledger.hours("N001"), Decimal::from(10));
    /// ```
    pub fn from_events(events: &[AssignmentEvent]) -> Self {
        let mut ledger = Self::new();
        for event in events {
            ledger.record(&event.staff_id, event.date, event.hours);
        }
        ledger
    }

    /// The state of a staff member, if any work has been tracked.
    pub fn get(&self, staff_id: &str) -> Option<&WorkState> {
        self.states.get(staff_id)
    }

    /// Cumulative hours of a staff member; zero when untracked.
    pub fn hours(&self, staff_id: &str) -> Decimal {
        self.get(staff_id).map_or(Decimal::ZERO, WorkState::hours)
    }

    /// Shift count of a staff member; zero when untracked.
    pub fn shift_count(&self, staff_id: &str) -> u32 {
        self.get(staff_id).map_or(0, WorkState::shift_count)
    }

    /// Iterates over tracked staff IDs and their states.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &WorkState)> {
        self.states.iter().map(|(id, state)| (id.as_str(), state))
    }

    /// Number of tracked staff members.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Returns true if no staff member is tracked.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub(crate) fn state_mut(&mut self, staff_id: &str) -> &mut WorkState {
        self.states.entry(staff_id.to_string()).or_default()
    }

    pub(crate) fn record(&mut self, staff_id: &str, date: NaiveDate, hours: Decimal) {
        self.state_mut(staff_id).record(date, hours);
    }
}
