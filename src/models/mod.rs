//! Core data models for the shift allocator.
//!
//! This module contains the domain records shared by the roster, demand,
//! allocation and summary modules.

mod assignment;
mod horizon;
mod slot;
mod staff;

pub use assignment::{AssignmentEvent, CoverageStats, UncoveredSlot};
pub use horizon::{PlanningHorizon, parse_day};
pub use slot::ShiftSlot;
pub use staff::{Ceilings, ContractMode, ShiftType, StaffMember};
