//! HTTP request handlers for the shift allocator API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::allocation::{Allocator, SeededShuffle, WorkLedger};
use crate::config::ConfigLoader;
use crate::demand::DemandStream;
use crate::error::{EngineError, EngineResult};
use crate::persistence::{AssignmentSink, persist_run};
use crate::roster::Roster;
use crate::summary::SummaryFilter;

use super::request::{AllocationRequest, DemandInput, PatternDemandRequest};
use super::response::{
    AllocationReport, ApiError, ApiErrorResponse, DemandResponse, SummaryResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/allocate", post(allocate_handler))
        .route("/demand", post(demand_handler))
        .route("/summary", get(summary_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, error: EngineError) -> Response {
    warn!(
        correlation_id = %correlation_id,
        error = %error,
        "Request failed"
    );
    let api_error: ApiErrorResponse = error.into();
    json_response(api_error.status, api_error.error)
}

fn json_rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // The body text carries serde's detailed message.
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

fn pattern_demand(request: &PatternDemandRequest, config: &ConfigLoader) -> EngineResult<DemandStream> {
    let pattern = match request.pattern {
        Some(pattern) => pattern,
        None => *config.pattern(&request.unit)?,
    };
    DemandStream::generate_range(&request.unit, request.start_date, request.end_date, &pattern)
}

fn build_demand(input: DemandInput, config: &ConfigLoader) -> EngineResult<DemandStream> {
    match input {
        DemandInput::Slots { slots } => DemandStream::from_records(slots),
        DemandInput::Pattern(request) => pattern_demand(&request, config),
    }
}

/// Handler for POST /allocate endpoint.
///
/// Validates the roster and demand, runs the allocator and optionally
/// persists the run. A persistence failure still returns the report.
async fn allocate_handler(
    State(state): State<AppState>,
    payload: Result<Json<AllocationRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing allocation request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    let config = state.config();
    let policy = config.policy();

    let roster = match Roster::from_records(request.staff, policy) {
        Ok(roster) => roster,
        Err(err) => return error_response(correlation_id, err),
    };
    let demand = match build_demand(request.demand, config) {
        Ok(demand) => demand,
        Err(err) => return error_response(correlation_id, err),
    };

    let mut store = if request.persist || request.include_history {
        match state.lock_sink() {
            Some(Ok(guard)) => Some(guard),
            Some(Err(err)) => return error_response(correlation_id, err),
            None if request.include_history => {
                return json_response(StatusCode::SERVICE_UNAVAILABLE, ApiError::store_unavailable());
            }
            None => None,
        }
    } else {
        None
    };

    let ledger = match store.as_deref() {
        Some(sink) if request.include_history => match sink.load_events() {
            Ok(events) => WorkLedger::from_events(&events),
            Err(err) => return error_response(correlation_id, err),
        },
        _ => WorkLedger::new(),
    };

    let start_time = Instant::now();
    let tie_breaker = request
        .seed
        .map_or_else(SeededShuffle::from_entropy, SeededShuffle::new);
    let result = Allocator::new(&roster, policy, tie_breaker)
        .with_ledger(ledger)
        .run(&demand);
    let mut report = AllocationReport::from(&result);

    if request.persist {
        match store.as_deref_mut() {
            Some(sink) => match persist_run(sink, &result, request.summary_strategy) {
                Ok(summary) => report.summary = Some(summary.rows()),
                Err(err) => {
                    warn!(
                        correlation_id = %correlation_id,
                        run_id = %result.run_id,
                        error = %err,
                        "Persisting allocation run failed"
                    );
                    let api_error: ApiErrorResponse = err.into();
                    report.persistence_error = Some(api_error.error);
                }
            },
            None => report.persistence_error = Some(ApiError::store_unavailable()),
        }
    }

    info!(
        correlation_id = %correlation_id,
        run_id = %result.run_id,
        staff = roster.len(),
        slots = demand.len(),
        assigned = result.coverage.assigned,
        shortfall = result.coverage.shortfall,
        persisted = request.persist && report.persistence_error.is_none(),
        duration_us = start_time.elapsed().as_micros(),
        "Allocation completed"
    );
    json_response(StatusCode::OK, report)
}

/// Handler for POST /demand endpoint.
///
/// Generates the slots of a weekly pattern over a date range.
async fn demand_handler(
    State(state): State<AppState>,
    payload: Result<Json<PatternDemandRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing demand request");

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => return json_rejection_response(correlation_id, rejection),
    };

    match pattern_demand(&request, state.config()) {
        Ok(demand) => {
            info!(
                correlation_id = %correlation_id,
                unit = %request.unit,
                slots = demand.len(),
                "Demand generated"
            );
            let total_required = demand.total_required();
            json_response(
                StatusCode::OK,
                DemandResponse {
                    slots: demand.into_slots(),
                    total_required,
                },
            )
        }
        Err(err) => error_response(correlation_id, err),
    }
}

/// Handler for GET /summary endpoint.
///
/// Returns the stored monthly summary narrowed by the query parameters.
async fn summary_handler(
    State(state): State<AppState>,
    query: Result<Query<SummaryFilter>, QueryRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing summary request");

    let filter = match query {
        Ok(Query(filter)) => filter,
        Err(rejection) => {
            warn!(
                correlation_id = %correlation_id,
                error = %rejection,
                "Invalid summary query"
            );
            return json_response(
                StatusCode::BAD_REQUEST,
                ApiError::validation_error(rejection.body_text()),
            );
        }
    };

    let summary = match state.lock_sink() {
        Some(Ok(sink)) => sink.load_summary(),
        Some(Err(err)) => Err(err),
        None => {
            return json_response(StatusCode::SERVICE_UNAVAILABLE, ApiError::store_unavailable());
        }
    };

    match summary {
        Ok(summary) => {
            let filtered = summary.filter(&filter);
            info!(
                correlation_id = %correlation_id,
                rows = filtered.len(),
                "Summary loaded"
            );
            json_response(StatusCode::OK, SummaryResponse::from(&filtered))
        }
        Err(err) => error_response(correlation_id, err),
    }
}
