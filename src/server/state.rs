//! Application state management.

use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::increment::{ConcurrencyMode, IncrementCoordinator};
use crate::sheet::SheetTable;
use crate::store::{self, SharedStore, StoreError};

/// Shared application state.
///
/// Holds the one store handle built at startup; handlers never reach for a
/// global client.
#[derive(Clone)]
pub struct AppState {
    table: SheetTable,
    coordinator: Arc<IncrementCoordinator>,
}

impl AppState {
    /// Wrap an already-built store.
    pub fn new(store: SharedStore, mode: ConcurrencyMode) -> Self {
        Self {
            table: SheetTable::new(store.clone()),
            coordinator: Arc::new(IncrementCoordinator::new(store, mode)),
        }
    }

    /// Create a new AppState from configuration.
    pub fn from_config(config: &Config) -> Result<Self, StateError> {
        let store = store::open(&config.sheet).map_err(StateError::OpenStore)?;
        Ok(Self::new(store, config.sheet.concurrency))
    }

    pub fn table(&self) -> &SheetTable {
        &self.table
    }

    pub fn coordinator(&self) -> &IncrementCoordinator {
        &self.coordinator
    }
}

/// Errors that can occur when setting up application state.
#[derive(Error, Debug)]
pub enum StateError {
    /// Failed to build the configured sheet store.
    #[error("Failed to open sheet store: {0}")]
    OpenStore(StoreError),
}
