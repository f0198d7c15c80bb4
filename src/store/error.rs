//! Error types for the sheet store module.

use thiserror::Error;

/// Errors that can occur while reading from or writing to a sheet store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Invalid credentials: {0}")]
    Credentials(String),

    #[error("Failed to obtain access token: {0}")]
    Token(String),

    #[cfg(feature = "google")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error reported by the remote API. The message is passed through as-is.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    #[error("Store configuration error: {0}")]
    Config(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}
