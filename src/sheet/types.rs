//! Data types for the sheet module.

use std::collections::HashMap;
use std::fmt;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, Result};

/// Number of rows above the first data row (the header row).
const HEADER_ROWS: usize = 1;

/// Raw sheet contents as returned by a store.
///
/// Row 0 is the header row. Rows are not guaranteed to have the same length:
/// trailing cells that were never written are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SheetMatrix {
    rows: Vec<Vec<String>>,
}

impl SheetMatrix {
    /// Wrap an already-built row list.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Build a matrix from anything that yields rows of string-like cells.
    ///
    /// ```
    /// use sheet_kv::sheet::SheetMatrix;
    ///
    /// let matrix = SheetMatrix::from_rows([vec!["ID", "Points"], vec!["1", "5"]]);
    /// assert_eq!(matrix.data_rows().len(), 1);
    /// ```
    pub fn from_rows<R, C>(rows: R) -> Self
    where
        R: IntoIterator<Item = C>,
        C: IntoIterator<Item: Into<String>>,
    {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(Into::into).collect())
                .collect(),
        }
    }

    /// True when the store returned no rows at all (not even headers).
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows, header included.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }

    /// The header row, or an empty slice for an empty matrix.
    pub fn headers(&self) -> &[String] {
        self.rows.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every row after the header.
    pub fn data_rows(&self) -> &[Vec<String>] {
        self.rows.get(HEADER_ROWS..).unwrap_or(&[])
    }

    /// Look up a single cell of a data row. Absent cells yield `None`.
    pub fn cell(&self, row: RowRef, column: usize) -> Option<&str> {
        self.data_rows()
            .get(row.data_index)
            .and_then(|cells| cells.get(column))
            .map(String::as_str)
    }
}

/// Column name to zero-based position, derived from a header row.
///
/// When a name repeats, the first position wins.
#[derive(Debug, Clone, Default)]
pub struct HeaderIndex {
    positions: HashMap<String, usize>,
}

impl HeaderIndex {
    pub fn from_headers(headers: &[String]) -> Self {
        let mut positions = HashMap::with_capacity(headers.len());
        for (index, name) in headers.iter().enumerate() {
            positions.entry(name.clone()).or_insert(index);
        }
        Self { positions }
    }

    /// Position of a column by exact name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    /// Position of a column that must exist.
    pub fn require(&self, name: &str) -> Result<usize> {
        self.position(name).ok_or_else(|| Error::SchemaMissing {
            column: name.to_string(),
        })
    }
}

/// A header-keyed view of one data row.
///
/// Keys keep header order. Serializes as a JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. An existing key keeps its position and takes the new value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (key, value) in &self.fields {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Location of a data row, both as an index into the data rows and as the
/// 1-based row number the store uses for addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRef {
    pub data_index: usize,
    pub sheet_row: usize,
}

impl RowRef {
    pub fn from_data_index(data_index: usize) -> Self {
        Self {
            data_index,
            sheet_row: data_index + HEADER_ROWS + 1,
        }
    }
}

/// A single cell address: zero-based column and 1-based sheet row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRef {
    pub column: usize,
    pub row: usize,
}

impl CellRef {
    pub fn new(column: usize, row: RowRef) -> Self {
        Self {
            column,
            row: row.sheet_row,
        }
    }

    /// A1 notation qualified by a sheet name, e.g. `data!B3` or `'My Sheet'!B3`.
    pub fn qualified(&self, sheet: &str) -> String {
        let plain = !sheet.is_empty()
            && sheet
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_');
        if plain {
            format!("{}!{}", sheet, self)
        } else {
            format!("'{}'!{}", sheet.replace('\'', "''"), self)
        }
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_letter(self.column), self.row)
    }
}

/// Spreadsheet column letters for a zero-based column index.
///
/// Uses bijective base-26: `0 -> A`, `25 -> Z`, `26 -> AA`, `701 -> ZZ`.
pub fn column_letter(index: usize) -> String {
    let mut letters = Vec::new();
    let mut n = index;
    loop {
        letters.push(char::from(b'A' + (n % 26) as u8));
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    letters.iter().rev().collect()
}
