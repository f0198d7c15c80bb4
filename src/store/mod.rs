//! Sheet store abstraction.
//!
//! A store is the system of record: it hands out the whole sheet as a string
//! matrix and accepts single-cell writes. It offers no transactions, so a
//! read followed by writes is never atomic.

#[cfg(feature = "google")]
mod credentials;
mod error;
#[cfg(feature = "google")]
mod google;
mod memory;

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::config::{SheetBackend, SheetConfig};
use crate::logging::info;
use crate::sheet::{CellRef, SheetMatrix};

#[cfg(feature = "google")]
pub use credentials::{AccessToken, ServiceAccount};
pub use error::StoreError;
#[cfg(feature = "google")]
pub use google::GoogleSheetsStore;
pub use memory::{CellWrite, MemoryStore};

/// A store handle shared by every request.
pub type SharedStore = Arc<dyn SheetStore>;

/// A value written to a single cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Int(i64),
    Text(String),
}

impl CellValue {
    /// JSON form used by stores that accept typed cell values.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            CellValue::Int(v) => serde_json::Value::from(*v),
            CellValue::Text(s) => serde_json::Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(v) => write!(f, "{}", v),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// The two capabilities the record mapper and the coordinator need.
pub trait SheetStore: Send + Sync {
    /// Fetch every row of the sheet, header row first.
    fn get_rows(&self) -> BoxFuture<'_, Result<SheetMatrix, StoreError>>;

    /// Overwrite a single cell.
    fn update_cell(&self, cell: CellRef, value: CellValue) -> BoxFuture<'_, Result<(), StoreError>>;
}

impl<S: SheetStore + ?Sized> SheetStore for Arc<S> {
    fn get_rows(&self) -> BoxFuture<'_, Result<SheetMatrix, StoreError>> {
        (**self).get_rows()
    }

    fn update_cell(&self, cell: CellRef, value: CellValue) -> BoxFuture<'_, Result<(), StoreError>> {
        (**self).update_cell(cell, value)
    }
}

/// Build the store selected by the `[sheet]` configuration section.
pub fn open(config: &SheetConfig) -> Result<SharedStore, StoreError> {
    match config.backend {
        SheetBackend::Memory => {
            info!(rows = config.rows.len(), "using in-memory sheet store");
            let matrix = SheetMatrix::new(config.rows.clone());
            Ok(Arc::new(MemoryStore::new(matrix)))
        }
        #[cfg(feature = "google")]
        SheetBackend::Google => {
            let spreadsheet_id = config.spreadsheet_id.as_deref().ok_or_else(|| {
                StoreError::Config("sheet.spreadsheet_id is required for the google backend".into())
            })?;
            let account = ServiceAccount::from_file(&config.credentials)?;
            info!(
                spreadsheet_id = spreadsheet_id,
                sheet = %config.sheet_name,
                account = %account.client_email,
                "using Google Sheets store"
            );
            let store = GoogleSheetsStore::new(account, spreadsheet_id, &config.sheet_name)?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "google"))]
        SheetBackend::Google => Err(StoreError::Config(
            "the google backend requires the `google` feature".into(),
        )),
    }
}
