//! Match decision + history endpoints

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::auth::CurrentUser;
use crate::db::matches::MatchRecordDetail;
use crate::{services, ApiError, AppState};

const MAX_PAGE_SIZE: i64 = 200;
const DEFAULT_PAGE_SIZE: i64 = 50;

#[derive(Debug, Deserialize)]
pub struct SaveMatchRequest {
    pub museum_coin_id: String,
    pub candidate_id: Option<String>,
    pub decision: String,
    pub notes: Option<String>,
}

/// Match row in the wire shape the curator UI expects
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResponse {
    pub id: i64,
    pub coin_id: String,
    pub candidate_id: Option<String>,
    pub similarity_score: f64,
    pub status: String,
    pub saved_at: String,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub museum_coin_title: Option<String>,
    pub candidate_title: Option<String>,
}

impl From<MatchRecordDetail> for MatchResponse {
    fn from(detail: MatchRecordDetail) -> Self {
        Self {
            id: detail.id,
            coin_id: detail.museum_coin_id,
            candidate_id: detail.candidate_id,
            similarity_score: detail.similarity_score,
            status: detail.status.as_str().to_string(),
            saved_at: detail.saved_at,
            notes: detail.notes,
            source: detail.source,
            museum_coin_title: detail.museum_coin_title,
            candidate_title: detail.candidate_title,
        }
    }
}

/// POST /api/match/save: record a curator decision
pub async fn save_match(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<SaveMatchRequest>,
) -> Result<Json<MatchResponse>, ApiError> {
    let mut tx = state.db.begin().await?;
    let record = services::decisions::log_decision(
        &mut *tx,
        state.settings.strict_decisions,
        &body.museum_coin_id,
        body.candidate_id.as_deref(),
        &body.decision,
        body.notes.as_deref(),
        Some(user.id),
    )
    .await?;
    let detail = crate::db::matches::get_detail(&mut *tx, record.id)
        .await?
        .ok_or_else(|| ApiError::Internal("Saved match row vanished".to_string()))?;
    tx.commit().await?;

    Ok(Json(detail.into()))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<String>,
    pub coin_id: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/match/history
pub async fn match_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Value>, ApiError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0).max(0);

    let mut conn = state.db.acquire().await?;
    let (items, total) = crate::db::matches::history(
        &mut conn,
        query.status.as_deref(),
        query.coin_id.as_deref(),
        limit,
        offset,
    )
    .await?;

    let items: Vec<MatchResponse> = items.into_iter().map(MatchResponse::from).collect();
    Ok(Json(json!({ "items": items, "total": total })))
}
