//! Common test utilities and fixtures.
//!
//! Sheets, a fault-injecting store wrapper, and (with the `server` feature)
//! an axum-test application over an in-memory store.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::BoxFuture;
use sheet_kv::sheet::{CellRef, SheetMatrix};
use sheet_kv::store::{CellValue, MemoryStore, SheetStore, StoreError};

// =============================================================================
// Sheets
// =============================================================================

/// Build a matrix from string literals.
pub fn sheet(rows: &[&[&str]]) -> SheetMatrix {
    SheetMatrix::from_rows(rows.iter().map(|r| r.iter().copied()))
}

/// A small leaderboard with ragged rows.
pub fn leaderboard() -> SheetMatrix {
    sheet(&[
        &["ID", "Name", "Points", "Votes"],
        &["1", "Ada", "5", "2"],
        &["2", "Grace", "12"],
        &["3", "Linus", "", "", "ignored"],
    ])
}

/// One row with ID "1" and the given Points, zero Votes.
pub fn single_row(points: i64) -> SheetMatrix {
    let points = points.to_string();
    sheet(&[&["ID", "Points", "Votes"], &["1", points.as_str(), "0"]])
}

/// Read a data cell from a memory store by header name.
pub fn cell(store: &MemoryStore, id: &str, column: &str) -> Option<String> {
    let matrix = store.snapshot();
    let position = matrix.headers().iter().position(|h| h == column)?;
    matrix
        .data_rows()
        .iter()
        .find(|row| row.first().map(String::as_str) == Some(id))
        .and_then(|row| row.get(position).cloned())
}

// =============================================================================
// Fault injection
// =============================================================================

/// Wraps a memory store and injects delays and failures.
pub struct FaultyStore {
    inner: Arc<MemoryStore>,
    /// The first read takes its snapshot, then sleeps this long before returning.
    first_read_delay: Option<Duration>,
    fail_reads: bool,
    /// 1-based index of the write that fails.
    fail_write: Option<usize>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl FaultyStore {
    pub fn new(inner: Arc<MemoryStore>) -> Self {
        Self {
            inner,
            first_read_delay: None,
            fail_reads: false,
            fail_write: None,
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
        }
    }

    pub fn delay_first_read(mut self, delay: Duration) -> Self {
        self.first_read_delay = Some(delay);
        self
    }

    pub fn fail_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub fn fail_write(mut self, nth: usize) -> Self {
        self.fail_write = Some(nth);
        self
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl SheetStore for FaultyStore {
    fn get_rows(&self) -> BoxFuture<'_, Result<SheetMatrix, StoreError>> {
        Box::pin(async move {
            if self.fail_reads {
                return Err(StoreError::Unavailable("quota exceeded".into()));
            }
            let rows = self.inner.get_rows().await?;
            let read = self.reads.fetch_add(1, Ordering::SeqCst);
            if let (0, Some(delay)) = (read, self.first_read_delay) {
                tokio::time::sleep(delay).await;
            }
            Ok(rows)
        })
    }

    fn update_cell(&self, cell: CellRef, value: CellValue) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let write = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_write == Some(write) {
                return Err(StoreError::Unavailable(format!("write {} rejected", write)));
            }
            self.inner.update_cell(cell, value).await
        })
    }
}

// =============================================================================
// Test Application
// =============================================================================

#[cfg(feature = "server")]
pub use app::TestApp;

#[cfg(feature = "server")]
mod app {
    use std::sync::Arc;

    use axum_test::TestServer;
    use sheet_kv::config::CorsConfig;
    use sheet_kv::server::{AppState, build_cors_layer, router};
    use sheet_kv::store::{MemoryStore, SharedStore};
    use sheet_kv::{ConcurrencyMode, SheetMatrix};

    /// Test application over an in-memory sheet.
    pub struct TestApp {
        pub server: TestServer,
        pub store: Arc<MemoryStore>,
    }

    impl TestApp {
        /// Create a test application serving `matrix`.
        pub fn new(matrix: SheetMatrix) -> anyhow::Result<Self> {
            let store = Arc::new(MemoryStore::new(matrix));
            let shared: SharedStore = store.clone();
            let server = TestServer::new(router(AppState::new(shared, ConcurrencyMode::Serialized)))?;
            Ok(Self { server, store })
        }

        /// Create a test application over an arbitrary store.
        pub fn with_store(store: SharedStore, mode: ConcurrencyMode) -> anyhow::Result<TestServer> {
            Ok(TestServer::new(router(AppState::new(store, mode)))?)
        }

        /// Create a test application with the CORS layer applied.
        pub fn with_cors(matrix: SheetMatrix, cors: &CorsConfig) -> anyhow::Result<Self> {
            let store = Arc::new(MemoryStore::new(matrix));
            let shared: SharedStore = store.clone();
            let app = router(AppState::new(shared, ConcurrencyMode::Serialized))
                .layer(build_cors_layer(cors));
            let server = TestServer::new(app)?;
            Ok(Self { server, store })
        }
    }
}
