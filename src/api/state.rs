//! Application state for the Payroll Engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::config::PayrollConfig;
use crate::engine::PayrollEngine;
use crate::store::MemoryStore;

/// Shared application state.
///
/// Holds the engine, and through it the record store and the loaded
/// payroll configuration.
#[derive(Clone)]
pub struct AppState {
    engine: PayrollEngine<MemoryStore>,
}

impl AppState {
    /// Creates a new application state around an existing engine.
    pub fn new(engine: PayrollEngine<MemoryStore>) -> Self {
        Self { engine }
    }

    /// Creates a state with an empty in-memory store.
    pub fn with_config(config: PayrollConfig) -> Self {
        Self::new(PayrollEngine::new(Arc::new(MemoryStore::new()), config))
    }

    /// Returns a reference to the engine.
    pub fn engine(&self) -> &PayrollEngine<MemoryStore> {
        &self.engine
    }
}
