//! Shift allocation.
//!
//! This module contains the eligibility checks, the per-person work ledger,
//! the tie-break strategies and the greedy allocator that ties them
//! together. Allocation is synchronous and single-threaded: every
//! assignment must be visible to the checks of the next slot.

mod allocator;
mod eligibility;
mod ledger;
mod tie_break;

pub use allocator::{AllocationAudit, AllocationResult, Allocator, SlotAudit, allocate};
pub use eligibility::{
    Rejection, evaluate, is_available, is_eligible, matches_scope, respects_minimum_rest,
    within_consecutive_cap, within_hour_ceiling, within_shift_ceiling,
};
pub use ledger::{WorkLedger, WorkState};
pub use tie_break::{RosterOrder, SeededShuffle, TieBreaker};
