//! Candidate search endpoints

use axum::{
    extract::{Path, State},
    Extension, Json,
};
use coinmatch_common::db::models::OnlineCoin;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::auth::CurrentUser;
use crate::{services, ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct TextSearchRequest {
    pub museum_coin_id: Option<String>,
    pub query: Option<String>,
    #[serde(default)]
    pub min_score: f64,
}

#[derive(Debug, Deserialize)]
pub struct ImageSearchRequest {
    pub museum_coin_id: Option<String>,
    // Image keys are accepted but not used for retrieval; results come
    // from the stored similarity scores.
    pub obverse_key: Option<String>,
    pub reverse_key: Option<String>,
    #[serde(default)]
    pub min_score: f64,
}

/// Candidate listing in the wire shape the curator UI expects
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateResponse {
    pub id: String,
    pub museum_coin_id: Option<String>,
    pub similarity_score: f64,
    pub listing_reference: String,
    pub sale_date: Option<String>,
    pub estimate_value: Option<String>,
    pub sale_price: Option<String>,
    pub listing_url: Option<String>,
    pub metadata: Option<Value>,
}

impl From<OnlineCoin> for CandidateResponse {
    fn from(coin: OnlineCoin) -> Self {
        Self {
            id: coin.id,
            museum_coin_id: coin.museum_coin_id,
            similarity_score: coin.similarity_score,
            listing_reference: coin.listing_reference,
            sale_date: coin.sale_date,
            estimate_value: coin.estimate_value,
            sale_price: coin.sale_price,
            listing_url: coin.listing_url,
            metadata: coin
                .metadata_json
                .map(|s| serde_json::from_str(&s).unwrap_or(Value::String(s))),
        }
    }
}

async fn run_and_link(
    state: &AppState,
    job_type: &str,
    museum_coin_id: Option<&str>,
    query_text: Option<&str>,
    min_score: f64,
    user_id: i64,
) -> Result<Value, ApiError> {
    let mut tx = state.db.begin().await?;
    let (job, results) = services::search::run_search(
        &mut *tx,
        job_type,
        museum_coin_id,
        query_text,
        min_score,
        Some(user_id),
    )
    .await?;
    let results = services::search::ensure_candidate_links(&mut *tx, results).await?;
    tx.commit().await?;

    let results: Vec<CandidateResponse> = results.into_iter().map(CandidateResponse::from).collect();
    Ok(json!({
        "job_id": job.id,
        "status": job.status,
        "results": results,
    }))
}

/// POST /api/search/text
pub async fn search_text(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<TextSearchRequest>,
) -> Result<Json<Value>, ApiError> {
    let response = run_and_link(
        &state,
        "text",
        body.museum_coin_id.as_deref(),
        body.query.as_deref(),
        body.min_score,
        user.id,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/search/image
pub async fn search_image(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<ImageSearchRequest>,
) -> Result<Json<Value>, ApiError> {
    let response = run_and_link(
        &state,
        "image",
        body.museum_coin_id.as_deref(),
        None,
        body.min_score,
        user.id,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/search/jobs/:job_id
///
/// Unknown ids report status "unknown" instead of 404: the UI polls
/// jobs it may have created against a prior database.
pub async fn get_job(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.db.acquire().await?;
    let job = crate::db::search_jobs::get_job(&mut conn, &job_id).await?;
    match job {
        Some(job) => Ok(Json(serde_json::to_value(job).map_err(|e| {
            ApiError::Internal(format!("Serialization failed: {}", e))
        })?)),
        None => Ok(Json(json!({ "id": job_id, "status": "unknown" }))),
    }
}
