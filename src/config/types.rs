//! Configuration types for the shift allocator.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files. Every structure has a
//! `Default` matching the SERMAS contract rules, so the engine also runs
//! with no configuration directory at all.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::demand::WeeklyPattern;
use crate::models::{Ceilings, ContractMode, ShiftType};

/// Hours credited per shift type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftHours {
    /// Morning shift length.
    pub morning: Decimal,
    /// Afternoon shift length.
    pub afternoon: Decimal,
    /// Night shift length.
    pub night: Decimal,
}

impl Default for ShiftHours {
    fn default() -> Self {
        Self {
            morning: Decimal::new(75, 1),
            afternoon: Decimal::new(75, 1),
            night: Decimal::from(10),
        }
    }
}

/// Full-contract annual ceilings per shift type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseCeilings {
    /// Ceilings for morning contracts.
    pub morning: Ceilings,
    /// Ceilings for afternoon contracts.
    pub afternoon: Ceilings,
    /// Ceilings for night contracts.
    pub night: Ceilings,
}

impl Default for BaseCeilings {
    fn default() -> Self {
        let day = Ceilings {
            hours: Decimal::new(16425, 1),
            shifts: Decimal::from(219),
        };
        Self {
            morning: day,
            afternoon: day,
            night: Ceilings {
                hours: Decimal::from(1470),
                shifts: Decimal::from(147),
            },
        }
    }
}

/// Contract rules applied by the roster and the eligibility filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractPolicy {
    /// Hours credited per shift type.
    pub shift_hours: ShiftHours,
    /// Full-contract ceilings per shift type.
    pub base_ceilings: BaseCeilings,
    /// Multiplier applied to both ceilings for partial contracts.
    pub partial_factor: Decimal,
    /// Longest run of consecutive calendar days a person may work.
    pub max_consecutive_days: u32,
    /// Minimum distance between two worked dates, in hours.
    pub min_rest_hours: i64,
}

impl Default for ContractPolicy {
    fn default() -> Self {
        Self {
            shift_hours: ShiftHours::default(),
            base_ceilings: BaseCeilings::default(),
            partial_factor: Decimal::new(8, 1),
            max_consecutive_days: 7,
            min_rest_hours: 12,
        }
    }
}

impl ContractPolicy {
    /// Hours credited for one shift of the given type.
    ///
    /// ```
    /// use shift_allocator::config::ContractPolicy;
    /// use shift_allocator::models::ShiftType;
    /// use rust_decimal::Decimal;
    ///
    /// let policy = ContractPolicy::default();
    /// assert_eq!(policy.shift_hours(ShiftType::Night), Decimal::from(10));
    /// ```
    pub fn shift_hours(&self, shift_type: ShiftType) -> Decimal {
        match shift_type {
            ShiftType::Morning => self.shift_hours.morning,
            ShiftType::Afternoon => self.shift_hours.afternoon,
            ShiftType::Night => self.shift_hours.night,
        }
    }

    /// Annual ceilings for a contract, scaled for partial mode.
    ///
    /// ```
    /// use shift_allocator::config::ContractPolicy;
    /// use shift_allocator::models::{ContractMode, ShiftType};
    /// use rust_decimal::Decimal;
    ///
    /// let policy = ContractPolicy::default();
    /// let ceilings = policy.ceilings(ShiftType::Morning, ContractMode::Partial);
    /// assert_eq!(ceilings.hours, Decimal::from(1314));
    /// assert_eq!(ceilings.shifts, Decimal::new(1752, 1));
    /// ```
    pub fn ceilings(&self, shift_type: ShiftType, contract_mode: ContractMode) -> Ceilings {
        let base = match shift_type {
            ShiftType::Morning => self.base_ceilings.morning,
            ShiftType::Afternoon => self.base_ceilings.afternoon,
            ShiftType::Night => self.base_ceilings.night,
        };
        match contract_mode {
            ContractMode::Full => base,
            ContractMode::Partial => Ceilings {
                hours: base.hours * self.partial_factor,
                shifts: base.shifts * self.partial_factor,
            },
        }
    }
}

/// Weekly demand patterns keyed by unit name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternsConfig {
    /// Map of unit name to its weekly pattern.
    #[serde(default)]
    pub patterns: BTreeMap<String, WeeklyPattern>,
}

/// The complete engine configuration.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    policy: ContractPolicy,
    patterns: BTreeMap<String, WeeklyPattern>,
}

impl EngineConfig {
    /// Creates a new engine configuration.
    pub fn new(policy: ContractPolicy, patterns: BTreeMap<String, WeeklyPattern>) -> Self {
        Self { policy, patterns }
    }

    /// Returns the contract policy.
    pub fn policy(&self) -> &ContractPolicy {
        &self.policy
    }

    /// Returns the weekly patterns keyed by unit.
    pub fn patterns(&self) -> &BTreeMap<String, WeeklyPattern> {
        &self.patterns
    }
}
