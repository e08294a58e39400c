//! Configuration loading and management for the shift allocator.
//!
//! This module loads the contract policy (shift hours, ceilings, rest rules)
//! and the per-unit weekly demand patterns from YAML files.
//!
//! # Example
//!
//! ```no_run
//! use shift_allocator::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/sermas").unwrap();
//! println!("Partial factor: {}", config.policy().partial_factor);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{BaseCeilings, ContractPolicy, EngineConfig, PatternsConfig, ShiftHours};
