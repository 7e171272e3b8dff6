//! Curator account queries

use coinmatch_common::db::models::User;
use coinmatch_common::{auth, db::now_timestamp, Result};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::warn;

/// Load a user by email
pub async fn get_by_email(conn: &mut SqliteConnection, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}

/// Create a curator account
pub async fn insert_user(
    conn: &mut SqliteConnection,
    email: &str,
    name: &str,
    password: &str,
) -> Result<User> {
    let salt = auth::generate_salt();
    let hash = auth::hash_password(password, &salt);
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, name, password_hash, password_salt, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(name)
    .bind(&hash)
    .bind(&salt)
    .bind(now_timestamp())
    .fetch_one(conn)
    .await?;
    Ok(user)
}

/// First-run seeding: create a default curator account when the users
/// table is empty, so the API is reachable on a fresh database.
pub async fn ensure_default_user(pool: &SqlitePool) -> Result<()> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    if count > 0 {
        return Ok(());
    }

    let mut conn = pool.acquire().await?;
    insert_user(
        &mut conn,
        "curator@coinmatch.local",
        "Default Curator",
        "coinmatch123",
    )
    .await?;
    warn!("Created default curator account curator@coinmatch.local (password 'coinmatch123') - change it");
    Ok(())
}
