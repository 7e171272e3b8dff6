//! Database initialization
//!
//! Creates the SQLite database on first run and brings the schema up
//! idempotently. Safe to call on every startup.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection pool and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&pool)
        .await?;

    // WAL allows concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA busy_timeout = 5000")
        .execute(&pool)
        .await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all tables and indexes (idempotent - safe to call multiple times)
///
/// Exposed separately from [`init_database`] so tests can run against
/// `sqlite::memory:` pools.
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_users_table(pool).await?;
    create_session_tokens_table(pool).await?;
    create_museum_coins_table(pool).await?;
    create_online_coins_table(pool).await?;
    create_matches_table(pool).await?;
    create_search_jobs_table(pool).await?;
    Ok(())
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            password_salt TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_session_tokens_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS session_tokens (
            id TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_museum_coins_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS museum_coins (
            coin_id TEXT PRIMARY KEY,
            mint TEXT NOT NULL DEFAULT '',
            authority TEXT NOT NULL DEFAULT '',
            date_range TEXT NOT NULL DEFAULT '',
            denomination TEXT NOT NULL DEFAULT '',
            metal TEXT NOT NULL DEFAULT '',
            weight REAL,
            diameter REAL,
            die_axis TEXT,
            obverse_description TEXT NOT NULL DEFAULT '',
            reverse_description TEXT NOT NULL DEFAULT '',
            obverse_inscription TEXT,
            reverse_inscription TEXT,
            monograms TEXT,
            reference_list TEXT,
            catalog_number TEXT,
            source_database TEXT,
            provenance_text TEXT,
            previous_owners TEXT,
            auction_history TEXT,
            estimate_value TEXT,
            sale_price TEXT,
            obverse_image_key TEXT,
            reverse_image_key TEXT,
            lot_description_raw TEXT,
            lot_description_en TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            source_type TEXT NOT NULL DEFAULT 'museum'
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_online_coins_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS online_coins (
            id TEXT PRIMARY KEY,
            museum_coin_id TEXT REFERENCES museum_coins(coin_id) ON DELETE SET NULL,
            similarity_score REAL NOT NULL DEFAULT 0.0,
            listing_reference TEXT NOT NULL DEFAULT '',
            sale_date TEXT,
            estimate_value TEXT,
            sale_price TEXT,
            listing_url TEXT,
            metadata_json TEXT,
            mint TEXT,
            authority TEXT,
            date_range TEXT,
            denomination TEXT,
            metal TEXT,
            weight REAL,
            diameter REAL,
            die_axis TEXT,
            obverse_description TEXT,
            reverse_description TEXT,
            obverse_inscription TEXT,
            reverse_inscription TEXT,
            monograms TEXT,
            reference_list TEXT,
            catalog_number TEXT,
            source_database TEXT,
            provenance_text TEXT,
            previous_owners TEXT,
            auction_history TEXT,
            obverse_image_key TEXT,
            reverse_image_key TEXT,
            lot_description_raw TEXT,
            lot_description_en TEXT,
            fetched_at TEXT NOT NULL,
            source_name TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_online_coins_fetched_at ON online_coins(fetched_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_matches_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS matches (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            museum_coin_id TEXT NOT NULL REFERENCES museum_coins(coin_id),
            candidate_id TEXT REFERENCES online_coins(id),
            similarity_score REAL NOT NULL DEFAULT 0.0,
            status TEXT NOT NULL DEFAULT 'Pending',
            notes TEXT,
            source TEXT,
            saved_at TEXT NOT NULL,
            decided_by INTEGER REFERENCES users(id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One match row per (museum coin, candidate) pair. Concurrent
    // double-inserts are rejected here, not in application logic.
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_match_pair ON matches(museum_coin_id, candidate_id)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_search_jobs_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS search_jobs (
            id TEXT PRIMARY KEY,
            job_type TEXT NOT NULL,
            museum_coin_id TEXT,
            query_text TEXT,
            obverse_key TEXT,
            reverse_key TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            created_by INTEGER REFERENCES users(id),
            created_at TEXT NOT NULL,
            completed_at TEXT,
            result_summary TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}
