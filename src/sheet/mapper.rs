//! Header-driven record mapping over a sheet store.

use crate::error::{Error, Result};
use crate::logging::debug;
use crate::store::SharedStore;

use super::types::{Record, SheetMatrix};

/// Name of the column records are looked up by.
pub const ID_COLUMN: &str = "ID";

/// Zip a header row with a data row.
///
/// Cells missing from a short row become `""`; cells past the last header are
/// dropped. A repeated header keeps its first position and takes the value of
/// its last occurrence.
pub fn map_row(headers: &[String], row: &[String]) -> Record {
    let mut record = Record::new();
    for (index, name) in headers.iter().enumerate() {
        let value = row.get(index).map(String::as_str).unwrap_or("");
        record.insert(name.as_str(), value);
    }
    record
}

/// One record per data row. An empty or header-only matrix yields no records.
pub fn records_from_matrix(matrix: &SheetMatrix) -> Vec<Record> {
    let headers = matrix.headers();
    matrix
        .data_rows()
        .iter()
        .map(|row| map_row(headers, row))
        .collect()
}

/// Read access to a sheet as records.
#[derive(Clone)]
pub struct SheetTable {
    store: SharedStore,
}

impl SheetTable {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Fetch the sheet and map every data row.
    pub async fn list_records(&self) -> Result<Vec<Record>> {
        let matrix = self.store.get_rows().await?;
        let records = records_from_matrix(&matrix);
        debug!(count = records.len(), "listed records");
        Ok(records)
    }

    /// Fetch the sheet and return the first record whose `ID` equals `id`.
    ///
    /// A sheet with no rows at all is [`Error::EmptySheet`]; a sheet without
    /// a matching row is [`Error::NotFound`].
    pub async fn find_record_by_id(&self, id: &str) -> Result<Record> {
        let matrix = self.store.get_rows().await?;
        if matrix.is_empty() {
            return Err(Error::EmptySheet);
        }

        records_from_matrix(&matrix)
            .into_iter()
            .find(|record| record.get(ID_COLUMN) == Some(id))
            .ok_or_else(|| Error::NotFound { id: id.to_string() })
    }
}
