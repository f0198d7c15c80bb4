//! Per-ID async locks.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// A table of async mutexes keyed by row ID.
///
/// Entries only live while some task holds or waits on them.
#[derive(Debug, Default)]
pub(crate) struct RowLocks {
    table: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl RowLocks {
    /// Wait until no other task holds the lock for `key`.
    ///
    /// The table entry is claimed before waiting, so a waiter that is
    /// cancelled still releases its claim.
    pub(crate) async fn lock(&self, key: &str) -> RowGuard<'_> {
        let entry = {
            let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
            TableEntry {
                locks: self,
                key: key.to_string(),
                mutex: Arc::clone(table.entry(key.to_string()).or_default()),
            }
        };
        let guard = Arc::clone(&entry.mutex).lock_owned().await;
        RowGuard {
            _guard: guard,
            _entry: entry,
        }
    }

    /// Number of IDs currently locked or waited on.
    pub(crate) fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// A claim on one table entry, held from the start of the wait until release.
struct TableEntry<'a> {
    locks: &'a RowLocks,
    key: String,
    mutex: Arc<AsyncMutex<()>>,
}

impl Drop for TableEntry<'_> {
    fn drop(&mut self) {
        let mut table = self
            .locks
            .table
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // One reference in the table, one in this claim: nobody else holds or waits.
        if Arc::strong_count(&self.mutex) <= 2 {
            table.remove(&self.key);
        }
    }
}

/// Held lock for one ID. Fields drop in order: the mutex is released before
/// the table entry is checked.
pub(crate) struct RowGuard<'a> {
    _guard: OwnedMutexGuard<()>,
    _entry: TableEntry<'a>,
}
