//! Pure computation of an increment against one fetched sheet.

use crate::error::{Error, Result};
use crate::sheet::{parse_leading_int, CellRef, HeaderIndex, RowRef, ScoreDelta, SheetMatrix};

/// Column holding the accumulated score.
pub const POINTS_COLUMN: &str = "Points";
/// Column counting how many increments a row received.
pub const VOTES_COLUMN: &str = "Votes";

/// Raw cells an increment was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Observed {
    row: RowRef,
    points_column: usize,
    votes_column: usize,
    points: Option<String>,
    votes: Option<String>,
}

/// The writes an increment will issue, derived from a single sheet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementPlan {
    /// Requested ID, trimmed.
    pub id: String,
    pub delta: ScoreDelta,
    pub new_points: i64,
    pub new_votes: i64,
    /// Number of data rows carrying this ID. Only the first is updated.
    pub matches: usize,
    observed: Observed,
}

impl IncrementPlan {
    /// Validate the sheet and compute the new Points and Votes values.
    ///
    /// Checks run in order: empty sheet, `Points` column, `Votes` column,
    /// then the ID, which is matched against the first cell of each data row
    /// with surrounding whitespace ignored on both sides.
    pub fn prepare(matrix: &SheetMatrix, id: &str, delta: ScoreDelta) -> Result<Self> {
        if matrix.is_empty() {
            return Err(Error::EmptySheet);
        }

        let headers = HeaderIndex::from_headers(matrix.headers());
        let points_column = headers.require(POINTS_COLUMN)?;
        let votes_column = headers.require(VOTES_COLUMN)?;

        let wanted = id.trim();
        let mut matching = matrix
            .data_rows()
            .iter()
            .enumerate()
            .filter(|(_, cells)| cells.first().map(|c| c.trim()) == Some(wanted))
            .map(|(index, _)| index);
        let data_index = matching.next().ok_or_else(|| Error::NotFound {
            id: wanted.to_string(),
        })?;
        let matches = 1 + matching.count();

        let row = RowRef::from_data_index(data_index);
        let points = matrix.cell(row, points_column).map(str::to_string);
        let votes = matrix.cell(row, votes_column).map(str::to_string);

        let current_points = points.as_deref().map(parse_leading_int).unwrap_or(0);
        let current_votes = votes.as_deref().map(parse_leading_int).unwrap_or(0);

        Ok(Self {
            id: wanted.to_string(),
            delta,
            new_points: current_points.saturating_add(delta.value()),
            new_votes: current_votes.saturating_add(1),
            matches,
            observed: Observed {
                row,
                points_column,
                votes_column,
                points,
                votes,
            },
        })
    }

    pub fn row(&self) -> RowRef {
        self.observed.row
    }

    pub fn points_cell(&self) -> CellRef {
        CellRef::new(self.observed.points_column, self.observed.row)
    }

    pub fn votes_cell(&self) -> CellRef {
        CellRef::new(self.observed.votes_column, self.observed.row)
    }

    /// True when a later read still shows the same row, columns and values
    /// this plan was computed from.
    pub fn is_current(&self, matrix: &SheetMatrix) -> bool {
        match Self::prepare(matrix, &self.id, self.delta) {
            Ok(again) => again.observed == self.observed,
            Err(_) => false,
        }
    }
}
