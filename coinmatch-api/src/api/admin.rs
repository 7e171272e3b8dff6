//! Admin endpoints: source sync and batch match generation

use axum::{extract::State, Json};
use serde_json::{json, Value};
use tracing::info;

use crate::{services, ApiError, AppState};

/// POST /api/admin/sync: fetch both configured feeds and merge-upsert
/// everything in one transaction.
pub async fn sync_sources(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let museum_url = state
        .settings
        .museum_source_url
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("museum_source_url is not configured".to_string()))?;
    let online_url = state
        .settings
        .online_source_url
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("online_source_url is not configured".to_string()))?;

    let client = reqwest::Client::new();
    let museum_records = services::ingest::fetch_source(&client, museum_url).await?;
    let online_records = services::ingest::fetch_source(&client, online_url).await?;

    let mut tx = state.db.begin().await?;
    let museum = services::ingest::upsert_museum_coins(&mut *tx, &museum_records).await?;
    let online = services::ingest::upsert_online_coins(&mut *tx, &online_records).await?;
    tx.commit().await?;

    info!(
        museum_upserted = museum.upserted,
        museum_skipped = museum.skipped,
        online_upserted = online.upserted,
        online_skipped = online.skipped,
        "Source sync finished"
    );

    Ok(Json(json!({
        "museum_updated": museum.upserted,
        "online_updated": online.upserted,
    })))
}

/// POST /api/admin/match: run the match generator over the whole catalog
pub async fn run_matching(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let mut tx = state.db.begin().await?;
    let updated = services::matcher::generate_matches(&mut *tx, None).await?;
    tx.commit().await?;

    info!(matches_updated = updated, "Match generation finished");
    Ok(Json(json!({ "matches_updated": updated })))
}
