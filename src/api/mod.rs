//! HTTP API module for the shift allocator.
//!
//! This module exposes the allocator, the demand generator and the stored
//! monthly summary as REST endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{AllocationRequest, DemandInput, PatternDemandRequest};
pub use response::{
    AllocationReport, ApiError, ApiErrorResponse, DemandResponse, StaffWorkload, SummaryResponse,
};
pub use state::AppState;
