//! Application state for the shift allocator API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::ConfigLoader;
use crate::error::{EngineError, EngineResult};
use crate::persistence::SqliteSink;

/// Shared application state.
///
/// Contains the loaded configuration and, optionally, the assignment store.
/// The store sits behind a mutex so that runs touching it are serialized.
#[derive(Clone)]
pub struct AppState {
    /// The loaded engine configuration.
    config: Arc<ConfigLoader>,
    /// The assignment store, if persistence is enabled.
    sink: Option<Arc<Mutex<SqliteSink>>>,
}

impl AppState {
    /// Creates a new application state without an assignment store.
    pub fn new(config: ConfigLoader) -> Self {
        Self {
            config: Arc::new(config),
            sink: None,
        }
    }

    /// Attaches an assignment store.
    pub fn with_sink(mut self, sink: SqliteSink) -> Self {
        self.sink = Some(Arc::new(Mutex::new(sink)));
        self
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns true if an assignment store is attached.
    pub fn has_sink(&self) -> bool {
        self.sink.is_some()
    }

    /// Locks the assignment store, if one is attached.
    pub fn lock_sink(&self) -> Option<EngineResult<MutexGuard<'_, SqliteSink>>> {
        self.sink.as_ref().map(|sink| {
            sink.lock().map_err(|_| EngineError::Persistence {
                message: "assignment store lock poisoned".to_string(),
            })
        })
    }
}
