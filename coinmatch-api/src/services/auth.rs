//! Credential check + session issue

use crate::db;
use coinmatch_common::auth::verify_password;
use coinmatch_common::db::models::{SessionToken, User};
use coinmatch_common::Result;
use sqlx::SqliteConnection;

/// Check credentials and mint a session token.
///
/// Returns None for an unknown email or a wrong password; the handler
/// maps both to the same 401 so the response does not leak which one.
pub async fn authenticate(
    conn: &mut SqliteConnection,
    expiry_minutes: i64,
    email: &str,
    password: &str,
) -> Result<Option<(User, SessionToken)>> {
    let Some(user) = db::users::get_by_email(conn, email).await? else {
        return Ok(None);
    };
    if !verify_password(password, &user.password_salt, &user.password_hash) {
        return Ok(None);
    }
    let token = db::sessions::create_token(conn, user.id, expiry_minutes).await?;
    Ok(Some((user, token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[tokio::test]
    async fn test_authenticate() {
        let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
        coinmatch_common::db::create_schema(&pool).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        db::users::insert_user(&mut conn, "curator@museum.example", "Ada", "hunter2")
            .await
            .unwrap();

        let session = authenticate(&mut conn, 480, "curator@museum.example", "hunter2")
            .await
            .unwrap();
        let (user, token) = session.expect("valid credentials");
        assert_eq!(user.email, "curator@museum.example");
        assert!(!token.id.is_empty());

        assert!(authenticate(&mut conn, 480, "curator@museum.example", "wrong")
            .await
            .unwrap()
            .is_none());
        assert!(authenticate(&mut conn, 480, "nobody@museum.example", "hunter2")
            .await
            .unwrap()
            .is_none());
    }
}
