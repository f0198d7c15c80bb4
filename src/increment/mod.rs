//! Score increments.
//!
//! An increment reads the whole sheet, finds the row for an ID, and writes
//! new `Points` and `Votes` values as two separate cell updates. The store
//! has no transactions, so the read and the two writes are never atomic:
//!
//! - In [`ConcurrencyMode::Unguarded`] two concurrent increments for the same
//!   row can both read the old values and one of the updates is lost.
//! - [`ConcurrencyMode::Serialized`] queues increments per ID inside this
//!   process. Other processes writing the same sheet are not covered.
//! - [`ConcurrencyMode::Optimistic`] re-reads the row right before writing and
//!   fails with [`Error::Conflict`] if it changed. The window between that
//!   check and the writes remains.
//!
//! If the second write fails after the first succeeded, the error propagates
//! and the row is left with new Points and old Votes.

mod locks;
mod plan;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::logging::{debug, info, warn};
use crate::sheet::{RowRef, ScoreDelta};
use crate::store::{CellValue, SharedStore};

use locks::RowLocks;
pub use plan::{IncrementPlan, POINTS_COLUMN, VOTES_COLUMN};

/// How concurrent increments for the same ID are handled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConcurrencyMode {
    /// Plain read-modify-write. Concurrent increments may lose updates.
    Unguarded,
    /// One increment per ID at a time within this process.
    #[default]
    Serialized,
    /// Re-check the row before writing and report a conflict if it moved.
    Optimistic,
}

impl fmt::Display for ConcurrencyMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConcurrencyMode::Unguarded => "unguarded",
            ConcurrencyMode::Serialized => "serialized",
            ConcurrencyMode::Optimistic => "optimistic",
        };
        f.write_str(name)
    }
}

impl FromStr for ConcurrencyMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unguarded" => Ok(ConcurrencyMode::Unguarded),
            "serialized" => Ok(ConcurrencyMode::Serialized),
            "optimistic" => Ok(ConcurrencyMode::Optimistic),
            other => Err(format!(
                "unknown concurrency mode '{}' (expected unguarded, serialized or optimistic)",
                other
            )),
        }
    }
}

/// Result of a successful increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementOutcome {
    pub id: String,
    pub row: RowRef,
    pub new_points: i64,
    pub new_votes: i64,
}

/// Applies score increments against a sheet store.
pub struct IncrementCoordinator {
    store: SharedStore,
    mode: ConcurrencyMode,
    locks: RowLocks,
}

impl IncrementCoordinator {
    pub fn new(store: SharedStore, mode: ConcurrencyMode) -> Self {
        Self {
            store,
            mode,
            locks: RowLocks::default(),
        }
    }

    pub fn mode(&self) -> ConcurrencyMode {
        self.mode
    }

    /// Add `delta` to the row's Points and one to its Votes.
    pub async fn increment_score(&self, id: &str, delta: ScoreDelta) -> Result<IncrementOutcome> {
        let _guard = match self.mode {
            ConcurrencyMode::Serialized => Some(self.locks.lock(id.trim()).await),
            ConcurrencyMode::Unguarded | ConcurrencyMode::Optimistic => None,
        };

        let matrix = self.store.get_rows().await?;
        let plan = IncrementPlan::prepare(&matrix, id, delta)?;
        if plan.matches > 1 {
            warn!(
                id = %plan.id,
                matches = plan.matches,
                row = plan.row().sheet_row,
                "duplicate ID, updating first matching row"
            );
        }
        debug!(
            id = %plan.id,
            row = plan.row().sheet_row,
            new_points = plan.new_points,
            new_votes = plan.new_votes,
            "computed increment"
        );

        if self.mode == ConcurrencyMode::Optimistic {
            let current = self.store.get_rows().await?;
            if !plan.is_current(&current) {
                warn!(id = %plan.id, "row changed before write");
                return Err(Error::Conflict { id: plan.id });
            }
        }

        self.store
            .update_cell(plan.points_cell(), CellValue::Int(plan.new_points))
            .await?;
        self.store
            .update_cell(plan.votes_cell(), CellValue::Int(plan.new_votes))
            .await?;

        info!(
            id = %plan.id,
            delta = plan.delta.value(),
            new_points = plan.new_points,
            "points incremented"
        );

        Ok(IncrementOutcome {
            row: plan.row(),
            new_points: plan.new_points,
            new_votes: plan.new_votes,
            id: plan.id,
        })
    }
}
