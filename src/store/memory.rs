//! In-memory sheet store.

use std::sync::{Mutex, PoisonError, RwLock};

use futures::future::BoxFuture;

use crate::sheet::{CellRef, SheetMatrix};

use super::{CellValue, SheetStore, StoreError};

/// A single acknowledged write, kept in order for inspection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellWrite {
    pub cell: CellRef,
    pub value: CellValue,
}

/// Sheet store that keeps its rows in process memory.
///
/// Writes behave like a spreadsheet: addressing a cell past the end of a row
/// (or past the last row) grows the sheet with empty cells.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: RwLock<Vec<Vec<String>>>,
    writes: Mutex<Vec<CellWrite>>,
}

impl MemoryStore {
    pub fn new(matrix: SheetMatrix) -> Self {
        Self {
            rows: RwLock::new(matrix.into_rows()),
            writes: Mutex::new(Vec::new()),
        }
    }

    /// Current contents of the sheet.
    pub fn snapshot(&self) -> SheetMatrix {
        let rows = self.rows.read().unwrap_or_else(PoisonError::into_inner);
        SheetMatrix::new(rows.clone())
    }

    /// Every write acknowledged so far, oldest first.
    pub fn writes(&self) -> Vec<CellWrite> {
        self.writes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn read_rows(&self) -> Result<SheetMatrix, StoreError> {
        let rows = self
            .rows
            .read()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        Ok(SheetMatrix::new(rows.clone()))
    }

    fn write_cell(&self, cell: CellRef, value: CellValue) -> Result<(), StoreError> {
        let row_index = cell
            .row
            .checked_sub(1)
            .ok_or_else(|| StoreError::InvalidRange(format!("row 0 in {}", cell)))?;

        let mut rows = self
            .rows
            .write()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?;
        if rows.len() <= row_index {
            rows.resize(row_index + 1, Vec::new());
        }
        let row = rows
            .get_mut(row_index)
            .ok_or_else(|| StoreError::InvalidRange(cell.to_string()))?;
        if row.len() <= cell.column {
            row.resize(cell.column + 1, String::new());
        }
        let slot = row
            .get_mut(cell.column)
            .ok_or_else(|| StoreError::InvalidRange(cell.to_string()))?;
        *slot = value.to_string();
        drop(rows);

        self.writes
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))?
            .push(CellWrite { cell, value });
        Ok(())
    }
}

impl SheetStore for MemoryStore {
    fn get_rows(&self) -> BoxFuture<'_, Result<SheetMatrix, StoreError>> {
        Box::pin(async move { self.read_rows() })
    }

    fn update_cell(&self, cell: CellRef, value: CellValue) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move { self.write_cell(cell, value) })
    }
}
