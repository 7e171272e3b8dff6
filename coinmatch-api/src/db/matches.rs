//! Match record queries
//!
//! The matches table holds at most one row per (museum coin, candidate)
//! pair, enforced by the unique index created in coinmatch-common.

use coinmatch_common::db::models::{MatchRecord, MatchStatus};
use coinmatch_common::Result;
use sqlx::SqliteConnection;

/// Fields for a new match row
#[derive(Debug, Clone)]
pub struct NewMatchRecord {
    pub museum_coin_id: String,
    pub candidate_id: Option<String>,
    pub similarity_score: f64,
    pub status: MatchStatus,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub saved_at: String,
    pub decided_by: Option<i64>,
}

/// Match row joined with display titles for the curator UI
#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct MatchRecordDetail {
    pub id: i64,
    pub museum_coin_id: String,
    pub candidate_id: Option<String>,
    pub similarity_score: f64,
    pub status: MatchStatus,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub saved_at: String,
    pub decided_by: Option<i64>,
    pub museum_coin_title: Option<String>,
    pub candidate_title: Option<String>,
}

/// Look up the match row for a (museum coin, candidate) pair.
///
/// `IS` instead of `=` so a null candidate id matches decision-only rows.
pub async fn find_pair(
    conn: &mut SqliteConnection,
    museum_coin_id: &str,
    candidate_id: Option<&str>,
) -> Result<Option<MatchRecord>> {
    let record = sqlx::query_as::<_, MatchRecord>(
        "SELECT * FROM matches WHERE museum_coin_id = ? AND candidate_id IS ?",
    )
    .bind(museum_coin_id)
    .bind(candidate_id)
    .fetch_optional(conn)
    .await?;
    Ok(record)
}

/// Insert a new match row for a pair
pub async fn insert_record(
    conn: &mut SqliteConnection,
    new: &NewMatchRecord,
) -> Result<MatchRecord> {
    let record = sqlx::query_as::<_, MatchRecord>(
        r#"
        INSERT INTO matches (
            museum_coin_id, candidate_id, similarity_score, status,
            notes, source, saved_at, decided_by
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(&new.museum_coin_id)
    .bind(&new.candidate_id)
    .bind(new.similarity_score)
    .bind(new.status)
    .bind(&new.notes)
    .bind(&new.source)
    .bind(&new.saved_at)
    .bind(new.decided_by)
    .fetch_one(conn)
    .await?;
    Ok(record)
}

/// Refresh an existing row's score/source/timestamp after regeneration.
/// Status and curator notes are left untouched.
pub async fn update_generated_score(
    conn: &mut SqliteConnection,
    id: i64,
    similarity_score: f64,
    source: Option<&str>,
    saved_at: &str,
) -> Result<()> {
    sqlx::query(
        "UPDATE matches SET similarity_score = ?, source = ?, saved_at = ? WHERE id = ?",
    )
    .bind(similarity_score)
    .bind(source)
    .bind(saved_at)
    .bind(id)
    .execute(conn)
    .await?;
    Ok(())
}

/// Overwrite a row with a curator decision
#[allow(clippy::too_many_arguments)]
pub async fn update_decision(
    conn: &mut SqliteConnection,
    id: i64,
    status: MatchStatus,
    notes: Option<&str>,
    similarity_score: f64,
    source: Option<&str>,
    saved_at: &str,
    decided_by: Option<i64>,
) -> Result<MatchRecord> {
    let record = sqlx::query_as::<_, MatchRecord>(
        r#"
        UPDATE matches
        SET status = ?, notes = ?, similarity_score = ?, source = ?, saved_at = ?, decided_by = ?
        WHERE id = ?
        RETURNING *
        "#,
    )
    .bind(status)
    .bind(notes)
    .bind(similarity_score)
    .bind(source)
    .bind(saved_at)
    .bind(decided_by)
    .bind(id)
    .fetch_one(conn)
    .await?;
    Ok(record)
}

/// Load a match row with display titles
pub async fn get_detail(conn: &mut SqliteConnection, id: i64) -> Result<Option<MatchRecordDetail>> {
    let detail = sqlx::query_as::<_, MatchRecordDetail>(
        r#"
        SELECT m.*, mc.catalog_number AS museum_coin_title,
               oc.listing_reference AS candidate_title
        FROM matches m
        JOIN museum_coins mc ON m.museum_coin_id = mc.coin_id
        LEFT JOIN online_coins oc ON m.candidate_id = oc.id
        WHERE m.id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(detail)
}

/// Curator decision history: optional status substring filter and coin
/// filter, newest decisions first, plus the unpaginated total.
pub async fn history(
    conn: &mut SqliteConnection,
    status: Option<&str>,
    coin_id: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<MatchRecordDetail>, i64)> {
    let total: i64 = sqlx::query_scalar(
        r#"
        SELECT COUNT(*) FROM matches
        WHERE (?1 = '' OR LOWER(status) LIKE '%' || LOWER(?1) || '%')
          AND (?2 = '' OR museum_coin_id = ?2)
        "#,
    )
    .bind(status.unwrap_or(""))
    .bind(coin_id.unwrap_or(""))
    .fetch_one(&mut *conn)
    .await?;

    let records = sqlx::query_as::<_, MatchRecordDetail>(
        r#"
        SELECT m.*, mc.catalog_number AS museum_coin_title,
               oc.listing_reference AS candidate_title
        FROM matches m
        JOIN museum_coins mc ON m.museum_coin_id = mc.coin_id
        LEFT JOIN online_coins oc ON m.candidate_id = oc.id
        WHERE (?1 = '' OR LOWER(m.status) LIKE '%' || LOWER(?1) || '%')
          AND (?2 = '' OR m.museum_coin_id = ?2)
        ORDER BY m.saved_at DESC
        LIMIT ?3 OFFSET ?4
        "#,
    )
    .bind(status.unwrap_or(""))
    .bind(coin_id.unwrap_or(""))
    .bind(limit)
    .bind(offset)
    .fetch_all(conn)
    .await?;

    Ok((records, total))
}
