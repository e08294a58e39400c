//! Response types for the shift allocator API.
//!
//! This module defines the allocation report, the summary view and the
//! error response structures for the HTTP API.

use std::collections::BTreeMap;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::allocation::{AllocationResult, Rejection};
use crate::error::EngineError;
use crate::models::{AssignmentEvent, CoverageStats, ShiftSlot, ShiftType, UncoveredSlot};
use crate::summary::{MonthlySummary, MonthlySummaryRow, SummaryTotals};

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }

    /// Creates the error returned when no assignment store is configured.
    pub fn store_unavailable() -> Self {
        Self::with_details(
            "STORE_UNAVAILABLE",
            "No assignment store is configured",
            "Start the server with a database path to enable persistence",
        )
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        let message = error.to_string();
        match &error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                ApiErrorResponse {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: ApiError::with_details("CONFIG_ERROR", "Configuration error", message),
                }
            }
            EngineError::UnknownPattern { unit } => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: ApiError::with_details(
                    "UNKNOWN_PATTERN",
                    message,
                    format!("Supply an inline pattern or configure one for '{}'", unit),
                ),
            },
            EngineError::Persistence { .. } => ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::new("PERSISTENCE_ERROR", message),
            },
            _ => ApiErrorResponse {
                status: StatusCode::BAD_REQUEST,
                error: match error.field() {
                    Some(field) => ApiError::with_details("VALIDATION_ERROR", message, field),
                    None => ApiError::validation_error(message),
                },
            },
        }
    }
}

/// Hours and shifts assigned to one staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffWorkload {
    /// Staff ID.
    pub staff_id: String,
    /// Cumulative hours.
    pub hours: Decimal,
    /// Number of shifts.
    pub shifts: u32,
}

/// Response body of the `/allocate` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllocationReport {
    /// Unique identifier of the run.
    pub run_id: Uuid,
    /// Seed that reproduces the run.
    pub seed: Option<u64>,
    /// Committed assignments.
    pub assignments: Vec<AssignmentEvent>,
    /// Slots left short.
    pub uncovered: Vec<UncoveredSlot>,
    /// Headcount accounting.
    pub coverage: CoverageStats,
    /// Filled positions as a percentage of required positions.
    pub coverage_percent: Decimal,
    /// Final workload per staff member, ordered by ID.
    pub workload: Vec<StaffWorkload>,
    /// How many candidates each check excluded over the run.
    pub rejections: BTreeMap<Rejection, u32>,
    /// Allocation time in microseconds.
    pub duration_us: u64,
    /// Stored monthly summary after persisting, when requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<MonthlySummaryRow>>,
    /// Write failure; the allocation above is still valid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence_error: Option<ApiError>,
}

impl From<&AllocationResult> for AllocationReport {
    fn from(result: &AllocationResult) -> Self {
        let mut workload: Vec<StaffWorkload> = result
            .ledger
            .iter()
            .map(|(staff_id, state)| StaffWorkload {
                staff_id: staff_id.to_string(),
                hours: state.hours(),
                shifts: state.shift_count(),
            })
            .collect();
        workload.sort_by(|a, b| a.staff_id.cmp(&b.staff_id));

        Self {
            run_id: result.run_id,
            seed: result.seed,
            assignments: result.assignments.clone(),
            uncovered: result.uncovered.clone(),
            coverage: result.coverage,
            coverage_percent: result.coverage.coverage_percent(),
            workload,
            rejections: result.audit.rejection_totals(),
            duration_us: result.audit.duration_us,
            summary: None,
            persistence_error: None,
        }
    }
}

/// Response body of the `/demand` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandResponse {
    /// Generated slots in allocation order.
    pub slots: Vec<ShiftSlot>,
    /// Sum of required headcount.
    pub total_required: u64,
}

/// Response body of the `/summary` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Matching summary rows.
    pub rows: Vec<MonthlySummaryRow>,
    /// Totals per staff member.
    pub by_staff: Vec<StaffWorkload>,
    /// Hours per unit.
    pub hours_by_unit: BTreeMap<String, Decimal>,
    /// Hours per shift type.
    pub hours_by_shift: BTreeMap<ShiftType, Decimal>,
    /// Sum over every matching row.
    pub total: SummaryTotals,
}

impl From<&MonthlySummary> for SummaryResponse {
    fn from(summary: &MonthlySummary) -> Self {
        Self {
            rows: summary.rows(),
            by_staff: summary
                .totals_by_staff()
                .into_iter()
                .map(|(staff_id, totals)| StaffWorkload {
                    staff_id,
                    hours: totals.hours,
                    shifts: totals.shifts,
                })
                .collect(),
            hours_by_unit: summary.hours_by_unit(),
            hours_by_shift: summary.hours_by_shift(),
            total: summary.grand_total(),
        }
    }
}
