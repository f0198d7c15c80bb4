//! API error types and JSON response formatting.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};

use crate::error::Error;

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
}

/// API error type that converts to HTTP responses.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    /// Create a new API error.
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// The sheet has no rows at all.
    pub fn no_data() -> Self {
        Self::new(StatusCode::NOT_FOUND, "EMPTY_SHEET", "No data found")
    }

    /// Record lookup found no row with the ID.
    pub fn item_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "ITEM_NOT_FOUND", "Item not found")
    }

    /// Increment found no row with the ID.
    pub fn id_not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "ID_NOT_FOUND", "ID not found")
    }

    /// A required column is missing from the header row.
    pub fn column_not_found(column: &str) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "COLUMN_NOT_FOUND",
            format!("Column '{}' not found", column),
        )
    }

    /// Request body could not be read.
    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_BODY", message)
    }

    /// Score delta is not an integer.
    pub fn invalid_delta(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "INVALID_DELTA", message)
    }

    /// Row changed while an increment was in flight.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "CONFLICT", message)
    }

    /// Map an error from a record lookup. A missing ID reads "Item not found".
    pub fn from_lookup(err: Error) -> Self {
        match err {
            Error::NotFound { .. } => Self::item_not_found(),
            other => other.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Log server errors at error level, client errors at debug level
        if self.status.is_server_error() {
            error!(
                status = %self.status.as_u16(),
                code = %self.code,
                message = %self.message,
                "server error response"
            );
        } else if self.status.is_client_error() {
            debug!(
                status = %self.status.as_u16(),
                code = %self.code,
                message = %self.message,
                "client error response"
            );
        }

        let body = ErrorResponse {
            error: self.message,
            code: self.code,
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match &err {
            Error::EmptySheet => Self::no_data(),
            Error::NotFound { .. } => Self::id_not_found(),
            Error::SchemaMissing { column } => Self::column_not_found(column),
            Error::InvalidDelta(msg) => Self::invalid_delta(msg.clone()),
            Error::Conflict { .. } => Self::conflict(err.to_string()),
            // Store failures keep the store's own message.
            Error::Store(store) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                store.to_string(),
            ),
        }
    }
}
