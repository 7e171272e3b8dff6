//! Source ingestion
//!
//! Pulls coin records from the configured museum and marketplace feeds
//! and upserts them into the catalog, merging partial payloads onto
//! whatever is already stored.

use crate::db;
use coinmatch_common::db::models::{
    merge_museum_coin, merge_online_coin, MuseumCoinPatch, OnlineCoinPatch,
};
use coinmatch_common::db::now_timestamp;
use coinmatch_common::{Error, Result};
use serde_json::Value;
use sqlx::SqliteConnection;
use std::time::Duration;
use tracing::warn;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// One raw record pulled from a feed, tagged with the feed it came from
#[derive(Debug, Clone)]
pub struct FetchedRecord {
    pub payload: Value,
    pub source: String,
}

/// Upsert counters returned by an ingestion pass
#[derive(Debug, Default, serde::Serialize)]
pub struct IngestSummary {
    pub upserted: u64,
    pub skipped: u64,
}

/// Fetch a feed and flatten it to a record list.
///
/// Feeds may respond with a bare JSON array or an envelope holding the
/// array under `items` or `data`. Anything else is rejected.
pub async fn fetch_source(client: &reqwest::Client, url: &str) -> Result<Vec<FetchedRecord>> {
    let body: Value = client
        .get(url)
        .timeout(FETCH_TIMEOUT)
        .send()
        .await
        .map_err(|e| Error::Internal(format!("Fetch failed for {}: {}", url, e)))?
        .error_for_status()
        .map_err(|e| Error::Internal(format!("Fetch failed for {}: {}", url, e)))?
        .json()
        .await
        .map_err(|e| Error::Internal(format!("Invalid JSON from {}: {}", url, e)))?;

    let items = match body {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("items").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => items,
            _ => {
                return Err(Error::InvalidInput(format!(
                    "Feed {} is not a record list",
                    url
                )))
            }
        },
        _ => {
            return Err(Error::InvalidInput(format!(
                "Feed {} is not a record list",
                url
            )))
        }
    };

    Ok(items
        .into_iter()
        .map(|payload| FetchedRecord {
            payload,
            source: url.to_string(),
        })
        .collect())
}

/// Pull the record id out of a payload: `coin_id` or `id`, string or number
fn record_id(payload: &Value) -> Option<String> {
    for key in ["coin_id", "id"] {
        match payload.get(key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// Merge-upsert museum coin records. Records without an id are skipped
/// with a warning rather than failing the whole batch.
pub async fn upsert_museum_coins(
    conn: &mut SqliteConnection,
    records: &[FetchedRecord],
) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();
    for record in records {
        let Some(id) = record_id(&record.payload) else {
            warn!(source = %record.source, "Skipping museum record with no id");
            summary.skipped += 1;
            continue;
        };
        let patch: MuseumCoinPatch = match serde_json::from_value(record.payload.clone()) {
            Ok(patch) => patch,
            Err(e) => {
                warn!(source = %record.source, coin_id = %id, "Skipping malformed museum record: {}", e);
                summary.skipped += 1;
                continue;
            }
        };
        let existing = db::coins::get_coin(conn, &id).await?;
        let merged = merge_museum_coin(existing, &id, patch, &now_timestamp());
        db::coins::save_coin(conn, &merged).await?;
        summary.upserted += 1;
    }
    Ok(summary)
}

/// Merge-upsert marketplace listings. `source_name` defaults to the
/// feed URL when the payload does not carry one.
pub async fn upsert_online_coins(
    conn: &mut SqliteConnection,
    records: &[FetchedRecord],
) -> Result<IngestSummary> {
    let mut summary = IngestSummary::default();
    for record in records {
        let Some(id) = record_id(&record.payload) else {
            warn!(source = %record.source, "Skipping listing with no id");
            summary.skipped += 1;
            continue;
        };
        let mut patch: OnlineCoinPatch = match serde_json::from_value(record.payload.clone()) {
            Ok(patch) => patch,
            Err(e) => {
                warn!(source = %record.source, listing_id = %id, "Skipping malformed listing: {}", e);
                summary.skipped += 1;
                continue;
            }
        };
        if patch.source_name.is_none() {
            patch.source_name = Some(record.source.clone());
        }
        let existing = db::candidates::get_candidate(conn, &id).await?;
        let merged = merge_online_coin(existing, &id, patch, &now_timestamp());
        db::candidates::save_candidate(conn, &merged).await?;
        summary.upserted += 1;
    }
    Ok(summary)
}
