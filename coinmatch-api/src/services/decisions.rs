//! Curator decision log
//!
//! Upserts the single match row per (museum coin, candidate) pair with
//! the curator's accept/reject/pending decision.

use crate::db;
use crate::db::matches::NewMatchRecord;
use coinmatch_common::db::models::{MatchRecord, MatchStatus};
use coinmatch_common::db::now_timestamp;
use coinmatch_common::{Error, Result};
use sqlx::SqliteConnection;

/// Record a curator decision for a pair.
///
/// The free-text decision is normalized through a fixed lookup table;
/// unrecognized input falls back to Pending unless `strict_decisions` is
/// set, in which case it is rejected. The score snapshot is taken from
/// the candidate's current similarity score at decision time, never
/// recomputed.
pub async fn log_decision(
    conn: &mut SqliteConnection,
    strict_decisions: bool,
    museum_coin_id: &str,
    candidate_id: Option<&str>,
    decision: &str,
    notes: Option<&str>,
    user_id: Option<i64>,
) -> Result<MatchRecord> {
    let museum_coin = db::coins::get_coin(conn, museum_coin_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Museum coin not found: {}", museum_coin_id)))?;

    let candidate = match candidate_id {
        Some(id) => Some(
            db::candidates::get_candidate(conn, id)
                .await?
                .ok_or_else(|| Error::NotFound(format!("Candidate listing not found: {}", id)))?,
        ),
        None => None,
    };

    let status = match MatchStatus::normalize_decision(decision) {
        Some(status) => status,
        None if strict_decisions => {
            return Err(Error::InvalidInput(format!(
                "Unrecognized decision: {}",
                decision
            )));
        }
        None => MatchStatus::Pending,
    };

    let similarity = candidate.as_ref().map(|c| c.similarity_score).unwrap_or(0.0);
    let source = candidate.as_ref().map(|c| c.listing_reference.clone());

    let existing = db::matches::find_pair(conn, &museum_coin.coin_id, candidate_id).await?;
    let record = match existing {
        Some(record) => {
            db::matches::update_decision(
                conn,
                record.id,
                status,
                notes,
                similarity,
                source.as_deref(),
                &now_timestamp(),
                user_id,
            )
            .await?
        }
        None => {
            db::matches::insert_record(
                conn,
                &NewMatchRecord {
                    museum_coin_id: museum_coin.coin_id.clone(),
                    candidate_id: candidate_id.map(|s| s.to_string()),
                    similarity_score: similarity,
                    status,
                    notes: notes.map(|s| s.to_string()),
                    source,
                    saved_at: now_timestamp(),
                    decided_by: user_id,
                },
            )
            .await?
        }
    };

    Ok(record)
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

    async fn seed(conn: &mut SqliteConnection) {
        db::users::insert_user(conn, "one@example.org", "One", "pw")
            .await
            .unwrap();
        db::users::insert_user(conn, "two@example.org", "Two", "pw")
            .await
            .unwrap();

        let coin = merge_museum_coin(None, "coin-1", Default::default(), "2026-01-01T00:00:00Z");
        db::coins::save_coin(conn, &coin).await.unwrap();

        let patch = OnlineCoinPatch {
            similarity_score: Some(0.87),
            listing_reference: Some("CNG Triton XXVII, Lot 112".to_string()),
            ..Default::default()
        };
        let cand = merge_online_coin(None, "cand-1", patch, "2026-01-01T00:00:00Z");
        db::candidates::save_candidate(conn, &cand).await.unwrap();
    }

    #[tokio::test]
    async fn test_approve_maps_to_accepted() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();
        seed(&mut conn).await;

        let record = log_decision(
            &mut conn,
            false,
            "coin-1",
            Some("cand-1"),
            "approve",
            Some("Reverse die matches plate."),
            Some(1),
        )
        .await
        .unwrap();

        assert_eq!(record.status, MatchStatus::Accepted);
        assert_eq!(record.similarity_score, 0.87);
        assert_eq!(record.source.as_deref(), Some("CNG Triton XXVII, Lot 112"));
        assert_eq!(record.decided_by, Some(1));
    }

    #[tokio::test]
    async fn test_unrecognized_defaults_to_pending() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();
        seed(&mut conn).await;

        let record = log_decision(&mut conn, false, "coin-1", Some("cand-1"), "blah", None, None)
            .await
            .unwrap();
        assert_eq!(record.status, MatchStatus::Pending);
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_unrecognized() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();
        seed(&mut conn).await;

        let result = log_decision(&mut conn, true, "coin-1", Some("cand-1"), "blah", None, None).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_missing_coin_and_candidate_not_found() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();
        seed(&mut conn).await;

        let result = log_decision(&mut conn, false, "coin-9", None, "accept", None, None).await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        let result =
            log_decision(&mut conn, false, "coin-1", Some("cand-9"), "accept", None, None).await;
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[tokio::test]
    async fn test_second_decision_updates_in_place() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();
        seed(&mut conn).await;

        let first = log_decision(&mut conn, false, "coin-1", Some("cand-1"), "save", None, None)
            .await
            .unwrap();
        let second = log_decision(
            &mut conn,
            false,
            "coin-1",
            Some("cand-1"),
            "reject",
            Some("Legend differs."),
            Some(2),
        )
        .await
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.status, MatchStatus::Rejected);
        assert_eq!(second.notes.as_deref(), Some("Legend differs."));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM matches")
            .fetch_one(&mut *conn)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_decision_without_candidate() {
        let pool = setup().await;
        let mut conn = pool.acquire().await.unwrap();
        seed(&mut conn).await;

        let record = log_decision(&mut conn, false, "coin-1", None, "reject", None, None)
            .await
            .unwrap();
        assert_eq!(record.candidate_id, None);
        assert_eq!(record.similarity_score, 0.0);
        assert_eq!(record.source, None);
    }
}
