//! Integration tests for the sheet-kv HTTP API server.
//!
//! These tests use axum-test to make requests against the router without starting a real server.

#![cfg(feature = "server")]

mod common;

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use common::{cell, leaderboard, sheet, single_row, FaultyStore, TestApp};
use serde_json::json;
use sheet_kv::config::CorsConfig;
use sheet_kv::store::{MemoryStore, SharedStore};
use sheet_kv::{ConcurrencyMode, SheetMatrix};

// =============================================================================
// Health Check Tests
// =============================================================================

#[tokio::test]
async fn test_health_check() -> anyhow::Result<()> {
    let app = TestApp::new(leaderboard())?;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    response.assert_text("ok");

    Ok(())
}

// =============================================================================
// Read Tests
// =============================================================================

#[tokio::test]
async fn test_list_records() -> anyhow::Result<()> {
    let app = TestApp::new(leaderboard())?;

    let response = app.server.get("/api/sheet").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(
        body,
        json!([
            {"ID": "1", "Name": "Ada", "Points": "5", "Votes": "2"},
            {"ID": "2", "Name": "Grace", "Points": "12", "Votes": ""},
            {"ID": "3", "Name": "Linus", "Points": "", "Votes": ""},
        ])
    );

    Ok(())
}

#[tokio::test]
async fn test_list_records_empty_sheet() -> anyhow::Result<()> {
    let app = TestApp::new(SheetMatrix::default())?;

    let response = app.server.get("/api/sheet").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!([]));

    Ok(())
}

#[tokio::test]
async fn test_get_record() -> anyhow::Result<()> {
    let app = TestApp::new(leaderboard())?;

    let response = app.server.get("/api/sheet/1").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["Name"].as_str(), Some("Ada"));
    assert_eq!(body["Points"].as_str(), Some("5"));

    Ok(())
}

#[tokio::test]
async fn test_get_record_with_encoded_id() -> anyhow::Result<()> {
    let app = TestApp::new(sheet(&[&["ID", "Points", "Votes"], &["a b", "1", "0"]]))?;

    let path = format!("/api/sheet/{}", urlencoding::encode("a b"));
    let response = app.server.get(&path).await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["ID"].as_str(), Some("a b"));

    Ok(())
}

#[tokio::test]
async fn test_get_record_not_found() -> anyhow::Result<()> {
    let app = TestApp::new(leaderboard())?;

    let response = app.server.get("/api/sheet/99").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"].as_str(), Some("Item not found"));

    Ok(())
}

#[tokio::test]
async fn test_get_record_empty_sheet() -> anyhow::Result<()> {
    let app = TestApp::new(SheetMatrix::default())?;

    let response = app.server.get("/api/sheet/1").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"].as_str(), Some("No data found"));
    assert_eq!(body["code"].as_str(), Some("EMPTY_SHEET"));

    Ok(())
}

// =============================================================================
// Increment Tests
// =============================================================================

#[tokio::test]
async fn test_increment() -> anyhow::Result<()> {
    let app = TestApp::new(sheet(&[&["ID", "Points", "Votes"], &["1", "5", "2"]]))?;

    let response = app
        .server
        .post("/api/sheet/1")
        .json(&json!({"Points": 3}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"].as_str(), Some("Points incremented for ID 1"));
    assert_eq!(body["newPoints"], json!(8));
    assert_eq!(body["newVotes"], json!(3));

    assert_eq!(app.store.writes().len(), 2);
    assert_eq!(cell(&app.store, "1", "Points").as_deref(), Some("8"));
    assert_eq!(cell(&app.store, "1", "Votes").as_deref(), Some("3"));

    // The change is visible to readers.
    let response = app.server.get("/api/sheet/1").await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["Points"].as_str(), Some("8"));

    Ok(())
}

#[tokio::test]
async fn test_increment_accepts_legacy_score_field() -> anyhow::Result<()> {
    let app = TestApp::new(single_row(10))?;

    let response = app
        .server
        .post("/api/sheet/1")
        .json(&json!({"score": "-4"}))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["newPoints"], json!(6));

    Ok(())
}

#[tokio::test]
async fn test_increment_id_not_found() -> anyhow::Result<()> {
    let app = TestApp::new(single_row(10))?;

    let response = app
        .server
        .post("/api/sheet/2")
        .json(&json!({"Points": 1}))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"].as_str(), Some("ID not found"));
    assert!(app.store.writes().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_increment_empty_sheet() -> anyhow::Result<()> {
    let app = TestApp::new(SheetMatrix::default())?;

    let response = app
        .server
        .post("/api/sheet/1")
        .json(&json!({"Points": 1}))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"].as_str(), Some("No data found"));

    Ok(())
}

#[tokio::test]
async fn test_increment_missing_columns() -> anyhow::Result<()> {
    let app = TestApp::new(sheet(&[&["ID", "Votes"], &["1", "0"]]))?;
    let response = app
        .server
        .post("/api/sheet/1")
        .json(&json!({"Points": 1}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"].as_str(), Some("Column 'Points' not found"));

    let app = TestApp::new(sheet(&[&["ID", "Points"], &["1", "0"]]))?;
    let response = app
        .server
        .post("/api/sheet/1")
        .json(&json!({"Points": 1}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"].as_str(), Some("Column 'Votes' not found"));
    assert!(app.store.writes().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_increment_rejects_bad_delta() -> anyhow::Result<()> {
    let app = TestApp::new(single_row(10))?;

    for body in [json!({"Points": "ten"}), json!({"Points": 1.5}), json!({}), json!({"Points": null})] {
        let response = app.server.post("/api/sheet/1").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"].as_str(), Some("INVALID_DELTA"));
    }

    let response = app.server.post("/api/sheet/1").text("{not json").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"].as_str(), Some("INVALID_BODY"));

    assert!(app.store.writes().is_empty());
    assert_eq!(cell(&app.store, "1", "Points").as_deref(), Some("10"));

    Ok(())
}

// =============================================================================
// Store Failure Tests
// =============================================================================

#[tokio::test]
async fn test_store_failure_is_json_500() -> anyhow::Result<()> {
    let store: SharedStore =
        Arc::new(FaultyStore::new(Arc::new(MemoryStore::new(leaderboard()))).fail_reads());
    let server = TestApp::with_store(store, ConcurrencyMode::Serialized)?;

    for path in ["/api/sheet", "/api/sheet/1"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"].as_str(), Some("Store unavailable: quota exceeded"));
        assert_eq!(body["code"].as_str(), Some("STORE_ERROR"));
    }

    let response = server
        .post("/api/sheet/1")
        .json(&json!({"Points": 1}))
        .await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    Ok(())
}

#[tokio::test]
async fn test_optimistic_mode_without_contention() -> anyhow::Result<()> {
    let memory = Arc::new(MemoryStore::new(single_row(1)));
    let store: SharedStore = memory.clone();
    let server = TestApp::with_store(store, ConcurrencyMode::Optimistic)?;

    let response = server
        .post("/api/sheet/1")
        .json(&json!({"Points": 2}))
        .await;

    response.assert_status_ok();
    assert_eq!(cell(&memory, "1", "Points").as_deref(), Some("3"));

    Ok(())
}

// =============================================================================
// CORS Tests
// =============================================================================

#[tokio::test]
async fn test_cors_allows_any_origin_by_default() -> anyhow::Result<()> {
    let app = TestApp::with_cors(leaderboard(), &CorsConfig::default())?;

    let response = app
        .server
        .get("/api/sheet")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("http://localhost:3000"),
        )
        .await;

    response.assert_status_ok();
    let allowed = response.headers().get("access-control-allow-origin").cloned();
    assert_eq!(allowed, Some(HeaderValue::from_static("*")));

    Ok(())
}

#[tokio::test]
async fn test_cors_disabled() -> anyhow::Result<()> {
    let cors = CorsConfig {
        enabled: false,
        ..CorsConfig::default()
    };
    let app = TestApp::with_cors(leaderboard(), &cors)?;

    let response = app
        .server
        .get("/api/sheet")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("http://localhost:3000"),
        )
        .await;

    response.assert_status_ok();
    assert!(response.headers().get("access-control-allow-origin").is_none());

    Ok(())
}
