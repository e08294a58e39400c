//! Staff member model and related types.
//!
//! This module defines the [`StaffMember`] struct together with the contract
//! enums ([`ShiftType`], [`ContractMode`]) and the per-person [`Ceilings`].

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The contracted shift of a staff member, and the shift of a demand slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftType {
    /// Morning shift ("Mañana").
    #[serde(alias = "Mañana")]
    Morning,
    /// Afternoon shift ("Tarde").
    #[serde(alias = "Tarde")]
    Afternoon,
    /// Night shift ("Noche").
    #[serde(alias = "Noche")]
    Night,
}

impl ShiftType {
    /// All shift types in the order a day is planned.
    pub const ALL: [ShiftType; 3] = [ShiftType::Morning, ShiftType::Afternoon, ShiftType::Night];

    /// The label used in roster and demand tables.
    ///
    /// ```
    /// use shift_allocator::models::ShiftType;
    ///
    /// assert_eq!(ShiftType::Night.label(), "Noche");
    /// ```
    pub fn label(&self) -> &'static str {
        match self {
            ShiftType::Morning => "Mañana",
            ShiftType::Afternoon => "Tarde",
            ShiftType::Night => "Noche",
        }
    }
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ShiftType {
    type Err = String;

    /// Parses either the table label or the English name, ignoring case.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "mañana" | "manana" | "morning" => Ok(ShiftType::Morning),
            "tarde" | "afternoon" => Ok(ShiftType::Afternoon),
            "noche" | "night" => Ok(ShiftType::Night),
            _ => Err("expected Mañana, Tarde or Noche".to_string()),
        }
    }
}

/// Whether a staff member works a full or a partial contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractMode {
    /// Full-time contract ("Completa").
    #[serde(alias = "Completa")]
    Full,
    /// Partial contract ("Parcial"); ceilings are scaled down.
    #[serde(alias = "Parcial")]
    Partial,
}

impl ContractMode {
    /// The label used in roster tables.
    pub fn label(&self) -> &'static str {
        match self {
            ContractMode::Full => "Completa",
            ContractMode::Partial => "Parcial",
        }
    }
}

impl fmt::Display for ContractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ContractMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "completa" | "full" => Ok(ContractMode::Full),
            "parcial" | "partial" => Ok(ContractMode::Partial),
            _ => Err("expected Completa or Parcial".to_string()),
        }
    }
}

/// Annual limits a staff member may accumulate in the planning period.
///
/// The shift ceiling is kept as a decimal because partial contracts scale it
/// to a fractional value (219 × 0.8 = 175.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ceilings {
    /// Maximum cumulative hours.
    pub hours: Decimal,
    /// Maximum number of shifts.
    pub shifts: Decimal,
}

/// A validated member of the roster.
///
/// Created by [`Roster::from_records`](crate::roster::Roster::from_records)
/// and read-only for the rest of a planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    /// Unique employee code.
    pub id: String,
    /// The unit the member is assigned to.
    pub unit: String,
    /// The contracted shift type.
    pub shift_type: ShiftType,
    /// Full or partial contract.
    pub contract_mode: ContractMode,
    /// Dates on which the member cannot work.
    #[serde(default)]
    pub unavailable: BTreeSet<NaiveDate>,
    /// Annual hour and shift ceilings derived from the contract.
    pub ceilings: Ceilings,
}

impl StaffMember {
    /// Returns true if the member declared `date` as unavailable.
    pub fn is_unavailable_on(&self, date: NaiveDate) -> bool {
        self.unavailable.contains(&date)
    }

    /// Returns true if the member works a partial contract.
    pub fn is_partial(&self) -> bool {
        self.contract_mode == ContractMode::Partial
    }
}
