//! HTTP API server for sheet-kv.
//!
//! This module exposes the record mapper and the increment coordinator over
//! a small JSON API built with axum.

mod error;
mod logging;
mod routes;
mod state;

pub use error::ApiError;
pub use logging::{init as init_logging, LoggingError};
pub use routes::{build_cors_layer, router};
pub use state::{AppState, StateError};
