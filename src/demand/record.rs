//! Raw demand rows.

use serde::{Deserialize, Serialize};

/// Column holding the slot date.
pub const COLUMN_DATE: &str = "Fecha";
/// Column holding the unit.
pub const COLUMN_UNIT: &str = "Unidad";
/// Column holding the shift label.
pub const COLUMN_SHIFT: &str = "Turno";
/// Column holding the required headcount.
pub const COLUMN_REQUIRED: &str = "Personal_Requerido";

/// Every column a demand table must carry.
pub const REQUIRED_COLUMNS: [&str; 4] = [COLUMN_DATE, COLUMN_UNIT, COLUMN_SHIFT, COLUMN_REQUIRED];

/// A headcount as supplied by the demand source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Headcount {
    /// An integer count.
    Count(i64),
    /// A spreadsheet number such as `3.0`.
    Number(f64),
    /// A text cell such as `"3"`.
    Text(String),
}

impl Headcount {
    /// Interprets the value as a non-negative whole number.
    pub fn to_count(&self) -> Option<u32> {
        match self {
            Headcount::Count(n) => u32::try_from(*n).ok(),
            Headcount::Number(x) if x.fract() == 0.0 && *x >= 0.0 && *x <= u32::MAX as f64 => {
                Some(*x as u32)
            }
            Headcount::Number(_) => None,
            Headcount::Text(text) => text.trim().parse().ok(),
        }
    }

    /// The raw value for error messages.
    pub fn raw(&self) -> String {
        match self {
            Headcount::Count(n) => n.to_string(),
            Headcount::Number(x) => x.to_string(),
            Headcount::Text(text) => text.clone(),
        }
    }
}

/// One demand row before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DemandRecord {
    /// Slot date, `YYYY-MM-DD`.
    #[serde(rename = "Fecha", alias = "date", default)]
    pub date: Option<String>,
    /// Unit name.
    #[serde(rename = "Unidad", alias = "unit", default)]
    pub unit: Option<String>,
    /// Shift label.
    #[serde(rename = "Turno", alias = "shift_type", default)]
    pub shift_type: Option<String>,
    /// Required headcount.
    #[serde(rename = "Personal_Requerido", alias = "required", default)]
    pub required: Option<Headcount>,
}
