//! Sheet record and increment handlers.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
};
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::increment::POINTS_COLUMN;
use crate::sheet::{Record, ScoreDelta};

use super::super::{error::ApiError, state::AppState};

/// Body field the original clients used before `Points`.
const LEGACY_DELTA_FIELD: &str = "score";

/// Response to a successful increment.
#[derive(Debug, Serialize)]
pub struct IncrementResponse {
    pub message: String,
    #[serde(rename = "newPoints")]
    pub new_points: i64,
    #[serde(rename = "newVotes")]
    pub new_votes: i64,
}

/// List every data row as a record.
pub async fn list_records(State(state): State<AppState>) -> Result<Json<Vec<Record>>, ApiError> {
    let records = state.table().list_records().await?;
    Ok(Json(records))
}

/// Get the first record whose `ID` field equals the path ID.
pub async fn get_record(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let record = state
        .table()
        .find_record_by_id(&id)
        .await
        .map_err(ApiError::from_lookup)?;
    Ok(Json(record))
}

/// Add the body's `Points` value to the row's Points and count one vote.
pub async fn increment_score(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<IncrementResponse>, ApiError> {
    info!(id = %id, "received increment request");
    let delta = parse_delta(&body)?;
    debug!(id = %id, delta = delta.value(), "parsed increment body");

    let outcome = state.coordinator().increment_score(&id, delta).await?;

    Ok(Json(IncrementResponse {
        message: format!("Points incremented for ID {}", id),
        new_points: outcome.new_points,
        new_votes: outcome.new_votes,
    }))
}

/// Read the score delta from a JSON object body.
fn parse_delta(body: &[u8]) -> Result<ScoreDelta, ApiError> {
    let value: JsonValue = serde_json::from_slice(body)
        .map_err(|e| ApiError::invalid_body(format!("Invalid JSON body: {}", e)))?;
    let object = value
        .as_object()
        .ok_or_else(|| ApiError::invalid_body("Request body must be a JSON object"))?;
    // A null field counts as absent.
    let field = [POINTS_COLUMN, LEGACY_DELTA_FIELD]
        .into_iter()
        .filter_map(|name| object.get(name))
        .find(|value| !value.is_null());
    Ok(ScoreDelta::from_json(field)?)
}
