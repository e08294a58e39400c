//! Request types for the shift allocator API.
//!
//! This module defines the JSON request structures for the `/allocate` and
//! `/demand` endpoints. Staff and demand rows reuse the raw record types so
//! that missing values are reported as validation errors naming the field.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::demand::{DemandRecord, WeeklyPattern};
use crate::persistence::SummaryStrategy;
use crate::roster::StaffRecord;

/// Request body for the `/allocate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationRequest {
    /// Roster rows.
    pub staff: Vec<StaffRecord>,
    /// Demand to allocate.
    pub demand: DemandInput,
    /// Tie-break seed; a random one is drawn and reported when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Write the run to the assignment store when one is configured.
    #[serde(default)]
    pub persist: bool,
    /// How the stored summary is refreshed when persisting.
    #[serde(default)]
    pub summary_strategy: SummaryStrategy,
    /// Seed the work ledger with every stored assignment before allocating.
    #[serde(default)]
    pub include_history: bool,
}

/// Demand as supplied in an allocation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DemandInput {
    /// Explicit slot rows.
    Slots {
        /// The rows, in any order.
        slots: Vec<DemandRecord>,
    },
    /// A weekly pattern over a date range.
    Pattern(PatternDemandRequest),
}

/// Request body for the `/demand` endpoint, also accepted as pattern demand
/// by `/allocate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternDemandRequest {
    /// Unit the slots belong to.
    pub unit: String,
    /// First day, inclusive.
    pub start_date: NaiveDate,
    /// Last day, inclusive; must be after `start_date`.
    pub end_date: NaiveDate,
    /// Inline pattern; the unit's configured pattern is used when absent.
    #[serde(default)]
    pub pattern: Option<WeeklyPattern>,
}
