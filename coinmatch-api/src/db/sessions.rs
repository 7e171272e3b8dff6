//! Session token queries

use coinmatch_common::db::models::{SessionToken, User};
use coinmatch_common::{auth, db::now_timestamp, Result};
use sqlx::SqliteConnection;

/// Issue a new session token for a user
pub async fn create_token(
    conn: &mut SqliteConnection,
    user_id: i64,
    expiry_minutes: i64,
) -> Result<SessionToken> {
    let created_at = chrono::Utc::now();
    let expires_at = auth::token_expiry(created_at, expiry_minutes);

    let token = sqlx::query_as::<_, SessionToken>(
        r#"
        INSERT INTO session_tokens (id, user_id, created_at, expires_at)
        VALUES (?, ?, ?, ?)
        RETURNING *
        "#,
    )
    .bind(auth::new_session_token())
    .bind(user_id)
    .bind(created_at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true))
    .bind(expires_at.to_rfc3339_opts(chrono::SecondsFormat::Micros, true))
    .fetch_one(conn)
    .await?;
    Ok(token)
}

/// Resolve a non-expired token to its user, or None
pub async fn get_user_by_token(
    conn: &mut SqliteConnection,
    token: &str,
) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT u.* FROM users u
        JOIN session_tokens t ON t.user_id = u.id
        WHERE t.id = ? AND t.expires_at > ?
        "#,
    )
    .bind(token)
    .bind(now_timestamp())
    .fetch_optional(conn)
    .await?;
    Ok(user)
}

/// Delete a session token (logout)
pub async fn delete_token(conn: &mut SqliteConnection, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM session_tokens WHERE id = ?")
        .bind(token)
        .execute(conn)
        .await?;
    Ok(())
}
