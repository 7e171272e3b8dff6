//! Candidate search
//!
//! Every search invocation is logged as a `search_jobs` row before the
//! results go back to the caller. Jobs complete synchronously.

use crate::db;
use coinmatch_common::db::models::{OnlineCoin, SearchJob};
use coinmatch_common::db::now_timestamp;
use coinmatch_common::Result;
use sqlx::SqliteConnection;
use uuid::Uuid;

/// Run a search over stored candidate listings and log it as a job.
///
/// Candidates are filtered by optional museum coin link, optional
/// case-insensitive substring over the listing metadata and reference,
/// and a minimum similarity score; ordered best-first.
pub async fn run_search(
    conn: &mut SqliteConnection,
    job_type: &str,
    museum_coin_id: Option<&str>,
    query_text: Option<&str>,
    min_score: f64,
    user_id: Option<i64>,
) -> Result<(SearchJob, Vec<OnlineCoin>)> {
    let results = db::candidates::search_candidates(conn, museum_coin_id, query_text, min_score).await?;

    let now = now_timestamp();
    let job = SearchJob {
        id: Uuid::new_v4().simple().to_string(),
        job_type: job_type.to_string(),
        museum_coin_id: museum_coin_id.map(|s| s.to_string()),
        query_text: query_text.map(|s| s.to_string()),
        obverse_key: None,
        reverse_key: None,
        status: "completed".to_string(),
        created_by: user_id,
        created_at: now.clone(),
        completed_at: Some(now),
        result_summary: Some(format!("{} candidates", results.len())),
    };
    db::search_jobs::insert_job(conn, &job).await?;

    Ok((job, results))
}

/// Weakly link any unlinked result to the first catalog coin so the
/// curator view always has a museum-side anchor. No-op when the catalog
/// is empty.
pub async fn ensure_candidate_links(
    conn: &mut SqliteConnection,
    candidates: Vec<OnlineCoin>,
) -> Result<Vec<OnlineCoin>> {
    let Some(anchor) = db::coins::first_coin(conn).await? else {
        return Ok(candidates);
    };

    let mut linked = Vec::with_capacity(candidates.len());
    for mut candidate in candidates {
        if candidate.museum_coin_id.is_none() {
            db::candidates::link_to_museum_coin(conn, &candidate.id, &anchor.coin_id).await?;
            candidate.museum_coin_id = Some(anchor.coin_id.clone());
        }
        linked.push(candidate);
    }
    Ok(linked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinmatch_common::db::models::{merge_museum_coin, merge_online_coin, OnlineCoinPatch};
    use sqlx::SqlitePool;

    async fn setup() -> SqlitePool {
        let pool = SqlitePool::connect("sqlite::memory:")
            .await
            .expect("in-memory database");
        coinmatch_common::db::create_schema(&pool).await.unwrap();
        pool
    }

    async fn seed_candidate(conn: &mut SqliteConnection, id: &str, score: f64, reference: &str) {
        let patch = OnlineCoinPatch {
            similarity_score: Some(score),
            listing_reference: Some(reference.to_string()),
            ..Default::default()
        };
        let cand = merge_online_coin(None, id, patch, "2026-01-01T00:00:00Z");
        db::candidates::save_candidate(conn, &cand).await.unwrap();
    }

    #[tokio::test]
    async fn test_search_logs_job_and_orders_by_score() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();
        db::users::insert_user(&mut conn, "one@example.org", "One", "pw")
            .await
            .unwrap();
        seed_candidate(&mut conn, "c-1", 0.40, "Leu 12, Lot 30").await;
        seed_candidate(&mut conn, "c-2", 0.90, "Leu 12, Lot 31").await;
        seed_candidate(&mut conn, "c-3", 0.10, "Leu 12, Lot 32").await;

        let (job, results) = run_search(&mut conn, "text", None, Some("leu"), 0.25, Some(1))
            .await
            .unwrap();

        assert_eq!(job.status, "completed");
        assert_eq!(job.result_summary.as_deref(), Some("2 candidates"));
        let ids: Vec<&str> = results.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c-2", "c-1"]);

        let stored = db::search_jobs::get_job(&mut conn, &job.id).await.unwrap();
        assert!(stored.is_some());
    }

    #[tokio::test]
    async fn test_link_unlinked_candidates_to_first_coin() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();

        let coin = merge_museum_coin(None, "coin-1", Default::default(), "2026-01-01T00:00:00Z");
        db::coins::save_coin(&mut conn, &coin).await.unwrap();
        seed_candidate(&mut conn, "c-1", 0.5, "Lot A").await;

        let (_, results) = run_search(&mut conn, "text", None, None, 0.0, None)
            .await
            .unwrap();
        let linked = ensure_candidate_links(&mut conn, results).await.unwrap();

        assert_eq!(linked[0].museum_coin_id.as_deref(), Some("coin-1"));
        let stored = db::candidates::get_candidate(&mut conn, "c-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.museum_coin_id.as_deref(), Some("coin-1"));
    }

    #[tokio::test]
    async fn test_link_is_noop_without_catalog() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();
        seed_candidate(&mut conn, "c-1", 0.5, "Lot A").await;

        let (_, results) = run_search(&mut conn, "text", None, None, 0.0, None)
            .await
            .unwrap();
        let linked = ensure_candidate_links(&mut conn, results).await.unwrap();
        assert_eq!(linked[0].museum_coin_id, None);
    }
}
