//! Raw roster rows and unavailability normalisation.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::parse_day;

/// Column holding the employee code.
pub const COLUMN_ID: &str = "ID";
/// Column holding the assigned unit.
pub const COLUMN_UNIT: &str = "Unidad_Asignada";
/// Column holding the contract mode (`Completa` / `Parcial`).
pub const COLUMN_CONTRACT_MODE: &str = "Jornada";
/// Column holding the contracted shift (`Mañana` / `Tarde` / `Noche`).
pub const COLUMN_SHIFT_TYPE: &str = "Turno_Contrato";
/// Column holding the unavailable dates.
pub const COLUMN_UNAVAILABLE: &str = "Fechas_No_Disponibilidad";

/// Every column a roster table must carry.
pub const REQUIRED_COLUMNS: [&str; 5] = [
    COLUMN_ID,
    COLUMN_UNIT,
    COLUMN_CONTRACT_MODE,
    COLUMN_SHIFT_TYPE,
    COLUMN_UNAVAILABLE,
];

/// Unavailable dates as they arrive from the roster source.
///
/// Either an explicit list of date strings, or a single text cell holding a
/// comma-separated list, optionally written as a bracketed literal
/// (`['2025-01-01', '2025-01-02']`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Unavailability {
    /// A list of date strings.
    List(Vec<String>),
    /// A comma-separated or literal-list text cell.
    Text(String),
}

impl Unavailability {
    /// Normalises the raw representation into a set of dates.
    ///
    /// Returns the first token that is not a `YYYY-MM-DD` date on failure.
    ///
    /// ```
    /// use shift_allocator::roster::Unavailability;
    ///
    /// let raw = Unavailability::Text("['2025-01-02', '2025-01-01']".to_string());
    /// let dates = raw.to_dates().unwrap();
    /// assert_eq!(dates.len(), 2);
    /// assert_eq!(dates.iter().next().unwrap().to_string(), "2025-01-01");
    /// ```
    pub fn to_dates(&self) -> Result<BTreeSet<NaiveDate>, String> {
        match self {
            Unavailability::List(items) => items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(parse_token)
                .collect(),
            Unavailability::Text(text) => parse_unavailability(text),
        }
    }
}

/// One roster row before validation.
///
/// Every field is optional so that a missing value is reported as a
/// validation error naming the column rather than as a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRecord {
    /// Employee code.
    #[serde(rename = "ID", alias = "id", default)]
    pub id: Option<String>,
    /// Assigned unit.
    #[serde(rename = "Unidad_Asignada", alias = "unit", default)]
    pub unit: Option<String>,
    /// Contract mode label.
    #[serde(rename = "Jornada", alias = "contract_mode", default)]
    pub contract_mode: Option<String>,
    /// Contracted shift label.
    #[serde(rename = "Turno_Contrato", alias = "shift_type", default)]
    pub shift_type: Option<String>,
    /// Unavailable dates, list or text form.
    #[serde(
        rename = "Fechas_No_Disponibilidad",
        alias = "unavailable_dates",
        default
    )]
    pub unavailable: Option<Unavailability>,
}

/// Parses a text cell of unavailable dates.
///
/// Empty cells yield an empty set.
pub fn parse_unavailability(text: &str) -> Result<BTreeSet<NaiveDate>, String> {
    let mut body = text.trim();
    if let Some(inner) = body.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        body = inner;
    }

    body.split(',')
        .map(|token| token.trim().trim_matches(|c| c == '\'' || c == '"').trim())
        .filter(|token| !token.is_empty())
        .map(parse_token)
        .collect()
}

fn parse_token(token: &str) -> Result<NaiveDate, String> {
    let token = token.trim();
    parse_day(token).ok_or_else(|| token.to_string())
}
