//! Record listing and lookup through a sheet store.

mod common;

use std::sync::Arc;

use common::{leaderboard, sheet, FaultyStore};
use sheet_kv::store::{MemoryStore, SharedStore};
use sheet_kv::{Error, SheetMatrix, SheetTable};

fn table(matrix: SheetMatrix) -> SheetTable {
    let store: SharedStore = Arc::new(MemoryStore::new(matrix));
    SheetTable::new(store)
}

#[tokio::test]
async fn test_list_records() -> anyhow::Result<()> {
    let records = table(leaderboard()).list_records().await?;
    assert_eq!(records.len(), 3);

    let grace = records.get(1).ok_or_else(|| anyhow::anyhow!("missing row"))?;
    assert_eq!(grace.get("Name"), Some("Grace"));
    assert_eq!(grace.get("Votes"), Some(""));

    let linus = records.get(2).ok_or_else(|| anyhow::anyhow!("missing row"))?;
    assert_eq!(linus.len(), 4);
    assert_eq!(
        serde_json::to_value(linus)?,
        serde_json::json!({"ID": "3", "Name": "Linus", "Points": "", "Votes": ""})
    );
    Ok(())
}

#[tokio::test]
async fn test_list_records_empty_and_header_only() -> anyhow::Result<()> {
    assert!(table(SheetMatrix::default()).list_records().await?.is_empty());
    assert!(table(sheet(&[&["ID", "Points"]])).list_records().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_find_record_by_id() -> anyhow::Result<()> {
    let record = table(leaderboard()).find_record_by_id("2").await?;
    assert_eq!(record.get("Points"), Some("12"));
    Ok(())
}

#[tokio::test]
async fn test_find_record_exact_match_only() {
    // Lookup by record does not trim.
    let result = table(leaderboard()).find_record_by_id(" 2").await;
    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[tokio::test]
async fn test_find_record_first_duplicate_wins() -> anyhow::Result<()> {
    let matrix = sheet(&[&["ID", "Name"], &["9", "first"], &["9", "second"]]);
    let record = table(matrix).find_record_by_id("9").await?;
    assert_eq!(record.get("Name"), Some("first"));
    Ok(())
}

#[tokio::test]
async fn test_find_record_empty_sheet_vs_not_found() {
    let empty = table(SheetMatrix::default()).find_record_by_id("1").await;
    assert!(matches!(empty, Err(Error::EmptySheet)));

    let header_only = table(sheet(&[&["ID"]])).find_record_by_id("1").await;
    assert!(matches!(header_only, Err(Error::NotFound { .. })));

    let missing = table(leaderboard()).find_record_by_id("99").await;
    assert!(matches!(missing, Err(Error::NotFound { id }) if id == "99"));
}

#[tokio::test]
async fn test_store_failure_propagates() {
    let store: SharedStore =
        Arc::new(FaultyStore::new(Arc::new(MemoryStore::new(leaderboard()))).fail_reads());
    let result = SheetTable::new(store).list_records().await;
    assert!(matches!(result, Err(Error::Store(_))));
}
