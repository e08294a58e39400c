//! Monthly summary aggregation.
//!
//! Rolls assignment events into hour and shift totals per staff member,
//! unit, shift type, contract mode and calendar month.
//!
//! Two strategies are available. [`MonthlySummary::rebuild`] recomputes
//! everything from a complete event log and is idempotent.
//! [`MonthlySummary::incremental`] adds newly committed events on top of an
//! existing summary; it is only correct if each event is passed once.

use std::collections::BTreeMap;
use std::ops::AddAssign;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{AssignmentEvent, ContractMode, ShiftType};

/// Grouping key of a summary row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SummaryKey {
    /// Staff ID.
    pub staff_id: String,
    /// Unit worked.
    pub unit: String,
    /// Shift type worked.
    pub shift_type: ShiftType,
    /// Contract mode at assignment time.
    pub contract_mode: ContractMode,
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1 to 12.
    pub month: u32,
}

impl SummaryKey {
    /// The key an event is summarised under.
    pub fn of(event: &AssignmentEvent) -> Self {
        let (year, month) = event.year_month();
        Self {
            staff_id: event.staff_id.clone(),
            unit: event.unit.clone(),
            shift_type: event.shift_type,
            contract_mode: event.contract_mode,
            year,
            month,
        }
    }
}

/// Hours and shift count accumulated under one key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryTotals {
    /// Sum of hours.
    pub hours: Decimal,
    /// Number of shifts.
    pub shifts: u32,
}

impl AddAssign for SummaryTotals {
    fn add_assign(&mut self, other: Self) {
        self.hours += other.hours;
        self.shifts += other.shifts;
    }
}

/// One flat summary row, with the column names of the summary table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlySummaryRow {
    /// Staff ID.
    #[serde(rename = "ID")]
    pub staff_id: String,
    /// Unit worked.
    #[serde(rename = "Unidad")]
    pub unit: String,
    /// Shift label, e.g. `Mañana`.
    #[serde(rename = "Turno")]
    pub shift_type: String,
    /// Contract label, e.g. `Completa`.
    #[serde(rename = "Jornada")]
    pub contract_mode: String,
    /// Calendar year.
    #[serde(rename = "Año")]
    pub year: i32,
    /// Calendar month.
    #[serde(rename = "Mes")]
    pub month: u32,
    /// Sum of hours.
    #[serde(rename = "Horas_Asignadas")]
    pub hours: Decimal,
    /// Number of shifts.
    #[serde(rename = "Jornadas_Asignadas")]
    pub shifts: u32,
}

/// Optional criteria for narrowing a summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryFilter {
    /// Keep only this year.
    #[serde(default)]
    pub year: Option<i32>,
    /// Keep only this month.
    #[serde(default)]
    pub month: Option<u32>,
    /// Keep only this unit.
    #[serde(default)]
    pub unit: Option<String>,
    /// Keep only this shift type.
    #[serde(default)]
    pub shift_type: Option<ShiftType>,
    /// Keep only this contract mode.
    #[serde(default)]
    pub contract_mode: Option<ContractMode>,
}

impl SummaryFilter {
    /// Returns true if the key satisfies every set criterion.
    pub fn matches(&self, key: &SummaryKey) -> bool {
        self.year.is_none_or(|year| key.year == year)
            && self.month.is_none_or(|month| key.month == month)
            && self.unit.as_deref().is_none_or(|unit| key.unit == unit)
            && self.shift_type.is_none_or(|shift| key.shift_type == shift)
            && self.contract_mode.is_none_or(|mode| key.contract_mode == mode)
    }
}

/// Monthly totals keyed by [`SummaryKey`], in key order.
///
/// # Example
///
/// ```
/// use shift_allocator::models::{AssignmentEvent, ContractMode, ShiftType};
/// use shift_allocator::summary::MonthlySummary;
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let event = |day| AssignmentEvent {
///     date: NaiveDate::from_ymd_opt(2025, 1, day).unwrap(),
///     unit: "UCI".to_string(),
///     shift_type: ShiftType::Night,
///     staff_id: "N001".to_string(),
///     contract_mode: ContractMode::Full,
///     hours: Decimal::from(10),
/// };
///
/// let summary = MonthlySummary::rebuild(&[event(1), event(2)]);
/// let rows = summary.rows();
/// assert_eq!(rows.len(), 1);
/// assert_eq!(rows[0].hours, Decimal::from(20));
/// assert_eq!(rows[0].shifts, 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MonthlySummary {
    totals: BTreeMap<SummaryKey, SummaryTotals>,
}

impl MonthlySummary {
    /// An empty summary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes the summary from a complete event log.
    pub fn rebuild(events: &[AssignmentEvent]) -> Self {
        let mut summary = Self::new();
        for event in events {
            summary.add(
                SummaryKey::of(event),
                SummaryTotals {
                    hours: event.hours,
                    shifts: 1,
                },
            );
        }
        summary
    }

    /// Adds `new_events` on top of an existing summary.
    pub fn incremental(history: &MonthlySummary, new_events: &[AssignmentEvent]) -> Self {
        let mut summary = history.clone();
        summary.merge(&Self::rebuild(new_events));
        summary
    }

    /// Adds every total of `other` to the matching key.
    pub fn merge(&mut self, other: &MonthlySummary) {
        for (key, totals) in &other.totals {
            self.add(key.clone(), *totals);
        }
    }

    /// Adds `totals` under `key`.
    pub fn add(&mut self, key: SummaryKey, totals: SummaryTotals) {
        *self.totals.entry(key).or_default() += totals;
    }

    /// Totals for one key.
    pub fn get(&self, key: &SummaryKey) -> Option<&SummaryTotals> {
        self.totals.get(key)
    }

    /// Iterates over keys and totals in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&SummaryKey, &SummaryTotals)> {
        self.totals.iter()
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// Returns true if the summary has no keys.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    /// A summary holding only keys that satisfy `filter`.
    pub fn filter(&self, filter: &SummaryFilter) -> Self {
        Self {
            totals: self
                .totals
                .iter()
                .filter(|(key, _)| filter.matches(key))
                .map(|(key, totals)| (key.clone(), *totals))
                .collect(),
        }
    }

    /// Flat rows in key order.
    pub fn rows(&self) -> Vec<MonthlySummaryRow> {
        self.totals
            .iter()
            .map(|(key, totals)| MonthlySummaryRow {
                staff_id: key.staff_id.clone(),
                unit: key.unit.clone(),
                shift_type: key.shift_type.label().to_string(),
                contract_mode: key.contract_mode.label().to_string(),
                year: key.year,
                month: key.month,
                hours: totals.hours,
                shifts: totals.shifts,
            })
            .collect()
    }

    /// Totals per staff member across every unit, shift and month.
    pub fn totals_by_staff(&self) -> BTreeMap<String, SummaryTotals> {
        let mut by_staff: BTreeMap<String, SummaryTotals> = BTreeMap::new();
        for (key, totals) in &self.totals {
            *by_staff.entry(key.staff_id.clone()).or_default() += *totals;
        }
        by_staff
    }

    /// Hours per unit.
    pub fn hours_by_unit(&self) -> BTreeMap<String, Decimal> {
        let mut by_unit: BTreeMap<String, Decimal> = BTreeMap::new();
        for (key, totals) in &self.totals {
            *by_unit.entry(key.unit.clone()).or_default() += totals.hours;
        }
        by_unit
    }

    /// Hours per shift type.
    pub fn hours_by_shift(&self) -> BTreeMap<ShiftType, Decimal> {
        let mut by_shift: BTreeMap<ShiftType, Decimal> = BTreeMap::new();
        for (key, totals) in &self.totals {
            *by_shift.entry(key.shift_type).or_default() += totals.hours;
        }
        by_shift
    }

    /// Sum of every total.
    pub fn grand_total(&self) -> SummaryTotals {
        let mut total = SummaryTotals::default();
        for totals in self.totals.values() {
            total += *totals;
        }
        total
    }
}

impl FromIterator<(SummaryKey, SummaryTotals)> for MonthlySummary {
    fn from_iter<I: IntoIterator<Item = (SummaryKey, SummaryTotals)>>(iter: I) -> Self {
        let mut summary = Self::new();
        for (key, totals) in iter {
            summary.add(key, totals);
        }
        summary
    }
}
