//! A spreadsheet exposed as a minimal record store.
//!
//! Rows of a sheet are read as header-keyed records, and score increments
//! bump the `Points` and `Votes` columns of the row carrying a given ID.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use sheet_kv::prelude::*;
//!
//! let store: SharedStore = Arc::new(MemoryStore::new(SheetMatrix::from_rows([
//!     vec!["ID", "Points", "Votes"],
//!     vec!["1", "5", "2"],
//! ])));
//!
//! let table = SheetTable::new(store.clone());
//! let record = table.find_record_by_id("1").await?;
//!
//! let coordinator = IncrementCoordinator::new(store, ConcurrencyMode::Serialized);
//! let outcome = coordinator.increment_score("1", ScoreDelta::new(3)).await?;
//! assert_eq!(outcome.new_points, 8);
//! ```
//!
//! # Modules
//!
//! - [`sheet`] - Record mapping over a header-driven string matrix
//! - [`increment`] - Read-modify-write score increments and concurrency modes
//! - [`store`] - The sheet store trait, an in-memory store and a Google Sheets store
//! - [`config`] - TOML configuration shared by the binaries
//! - `server` - HTTP API (requires `server` feature)
//!
//! # Feature Flags
//!
//! - `google` - Google Sheets store (enabled by default)
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `cli` - Enable the command-line interface binary
//! - `server` - Enable the HTTP API server
//! - `full` - Enable all features

pub mod config;
pub mod increment;
mod logging;
pub mod prelude;
#[cfg(feature = "server")]
pub mod server;
pub mod sheet;
pub mod store;

mod error;

// Re-export the unified error type
pub use error::{Error, Result};

pub use config::Config;
pub use increment::{ConcurrencyMode, IncrementCoordinator, IncrementOutcome};
pub use sheet::{Record, ScoreDelta, SheetMatrix, SheetTable};
pub use store::{MemoryStore, SharedStore, SheetStore, StoreError};

#[cfg(feature = "google")]
pub use store::GoogleSheetsStore;
