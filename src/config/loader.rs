//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the engine
//! configuration from YAML files.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::demand::WeeklyPattern;
use crate::error::{EngineError, EngineResult};

use super::types::{ContractPolicy, EngineConfig, PatternsConfig};

/// Loads and provides access to the engine configuration.
///
/// # Directory Structure
///
/// ```text
/// config/sermas/
/// ├── policy.yaml     # Shift hours, ceilings, rest rules
/// └── patterns.yaml   # Weekly demand pattern per unit (optional)
/// ```
///
/// # Example
///
/// ```no_run
/// use shift_allocator::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/sermas").unwrap();
/// println!("Consecutive-day cap: {}", loader.policy().max_consecutive_days);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConfigLoader {
    config: EngineConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// `policy.yaml` is required; `patterns.yaml` is optional and yields no
    /// named patterns when absent.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use shift_allocator::config::ConfigLoader;
    ///
    /// let loader = ConfigLoader::load("./config/sermas")?;
    /// # Ok::<(), shift_allocator::error::EngineError>(())
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();

        let policy = Self::load_yaml::<ContractPolicy>(&path.join("policy.yaml"))?;

        let patterns_path = path.join("patterns.yaml");
        let patterns = if patterns_path.exists() {
            Self::load_yaml::<PatternsConfig>(&patterns_path)?.patterns
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            config: EngineConfig::new(policy, patterns),
        })
    }

    /// Returns the built-in configuration: default policy, no patterns.
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the underlying engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the contract policy.
    pub fn policy(&self) -> &ContractPolicy {
        self.config.policy()
    }

    /// Gets the weekly demand pattern configured for a unit.
    ///
    /// Returns `UnknownPattern` if the unit has no pattern.
    pub fn pattern(&self, unit: &str) -> EngineResult<&WeeklyPattern> {
        self.config
            .patterns()
            .get(unit)
            .ok_or_else(|| EngineError::UnknownPattern {
                unit: unit.to_string(),
            })
    }

    /// Names of the units with a configured pattern.
    pub fn units(&self) -> impl Iterator<Item = &str> {
        self.config.patterns().keys().map(String::as_str)
    }
}
