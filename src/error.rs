//! Error types for the shift allocator.
//!
//! This module provides strongly-typed errors using the `thiserror` crate.
//! Input-shape problems are validation errors and abort a run before any
//! allocation happens; sink failures are persistence errors and are
//! reported after allocation without discarding the computed result.
//! A slot that cannot be fully staffed is not an error.

use chrono::NaiveDate;
use thiserror::Error;

/// The main error type for the shift allocator.
///
/// # Example
///
/// ```
/// use shift_allocator::error::EngineError;
///
/// let error = EngineError::MissingColumn {
///     table: "roster".to_string(),
///     column: "Turno_Contrato".to_string(),
/// };
/// assert_eq!(error.to_string(), "roster table is missing required column 'Turno_Contrato'");
/// assert!(error.is_validation());
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// An input table lacks a required column.
    #[error("{table} table is missing required column '{column}'")]
    MissingColumn {
        /// The table being read ("roster" or "demand").
        table: String,
        /// The missing column name.
        column: String,
    },

    /// A row of an input table has no value for a required field.
    #[error("{table} row {row}: missing value for '{field}'")]
    MissingField {
        /// The table being read.
        table: String,
        /// Zero-based row index.
        row: usize,
        /// The field without a value.
        field: String,
    },

    /// A row of an input table carries a value outside the accepted domain.
    #[error("{table} row {row}: invalid value '{value}' for '{field}': {message}")]
    InvalidField {
        /// The table being read.
        table: String,
        /// Zero-based row index.
        row: usize,
        /// The offending field.
        field: String,
        /// The raw value as supplied.
        value: String,
        /// What was expected instead.
        message: String,
    },

    /// Two roster rows share the same staff ID.
    #[error("duplicate staff ID '{id}' in roster")]
    DuplicateStaff {
        /// The repeated ID.
        id: String,
    },

    /// A planning horizon is empty or inverted.
    #[error("invalid date range: end {end} must be after start {start}")]
    InvalidDateRange {
        /// Requested first day.
        start: NaiveDate,
        /// Requested last day.
        end: NaiveDate,
    },

    /// No weekly demand pattern is configured for the unit.
    #[error("no weekly demand pattern configured for unit '{unit}'")]
    UnknownPattern {
        /// The unit that was requested.
        unit: String,
    },

    /// An input table could not be decoded at all.
    #[error("malformed {table} table: {message}")]
    MalformedTable {
        /// The table being read.
        table: String,
        /// Decoder message.
        message: String,
    },

    /// The assignment sink failed to read or write.
    #[error("persistence error: {message}")]
    Persistence {
        /// A description of the storage failure.
        message: String,
    },
}

impl EngineError {
    /// Returns true for input-shape errors that abort a run before allocation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EngineError::MissingColumn { .. }
                | EngineError::MissingField { .. }
                | EngineError::InvalidField { .. }
                | EngineError::DuplicateStaff { .. }
                | EngineError::InvalidDateRange { .. }
                | EngineError::UnknownPattern { .. }
                | EngineError::MalformedTable { .. }
        )
    }

    /// Returns true for assignment sink failures.
    pub fn is_persistence(&self) -> bool {
        matches!(self, EngineError::Persistence { .. })
    }

    /// The name of the field or column a validation error refers to, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            EngineError::MissingColumn { column, .. } => Some(column),
            EngineError::MissingField { field, .. } | EngineError::InvalidField { field, .. } => {
                Some(field)
            }
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for EngineError {
    fn from(error: rusqlite::Error) -> Self {
        EngineError::Persistence {
            message: error.to_string(),
        }
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
