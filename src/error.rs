//! Unified error type for the sheet-kv library.
//!
//! Every operation on the mapper and the increment coordinator returns this
//! [`Error`]. Store failures are wrapped as [`Error::Store`] and keep the
//! store's own message.

use thiserror::Error;

use crate::store::StoreError;

/// Unified error type for all sheet-kv operations.
#[derive(Error, Debug)]
pub enum Error {
    /// The store returned no rows at all, not even a header row.
    #[error("No data found")]
    EmptySheet,

    /// No data row carries the requested ID.
    #[error("ID not found: {id}")]
    NotFound { id: String },

    /// A column required by the operation is missing from the header row.
    #[error("Column '{column}' not found")]
    SchemaMissing { column: String },

    /// The score delta could not be coerced to an integer.
    #[error("Invalid score delta: {0}")]
    InvalidDelta(String),

    /// The target row changed between the read and the write.
    #[error("Row for ID {id} changed during the update, retry")]
    Conflict { id: String },

    /// The underlying store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if this is a store failure.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Returns `true` if repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}
