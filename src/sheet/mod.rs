//! Tabular record mapping.
//!
//! A sheet is a ragged matrix of string cells whose first row names the
//! columns. This module turns that matrix into header-keyed [`Record`]s and
//! resolves rows by ID. Nothing here is cached: every operation works on a
//! matrix fetched for that call.

mod coerce;
mod mapper;
mod types;

pub use coerce::{parse_leading_int, ScoreDelta};
pub use mapper::{map_row, records_from_matrix, SheetTable, ID_COLUMN};
pub use types::{column_letter, CellRef, HeaderIndex, Record, RowRef, SheetMatrix};
