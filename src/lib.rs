//! Greedy shift-assignment engine for nursing rosters.
//!
//! This crate assigns staff to recurring morning, afternoon and night shifts
//! under annual hour and shift ceilings, a consecutive-day cap and a minimum
//! rest rule, reports the slots it could not staff, and rolls committed
//! assignments into monthly totals.

#![warn(missing_docs)]

pub mod allocation;
pub mod api;
pub mod config;
pub mod demand;
pub mod error;
pub mod models;
pub mod persistence;
pub mod roster;
pub mod summary;
pub mod tables;
