//! Convenient re-exports for common usage patterns.
//!
//! ```ignore
//! use sheet_kv::prelude::*;
//!
//! let table = SheetTable::new(store);
//! let records = table.list_records().await?;
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Record mapping
pub use crate::sheet::{
    map_row, records_from_matrix, CellRef, HeaderIndex, Record, RowRef, ScoreDelta, SheetMatrix,
    SheetTable,
};

// Increments
pub use crate::increment::{
    ConcurrencyMode, IncrementCoordinator, IncrementOutcome, IncrementPlan,
};

// Stores
pub use crate::store::{CellValue, MemoryStore, SharedStore, SheetStore, StoreError};

#[cfg(feature = "google")]
pub use crate::store::{GoogleSheetsStore, ServiceAccount};
