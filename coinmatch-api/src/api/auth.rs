//! Login, logout, profile, and the session-token middleware

use axum::{
    extract::{Request, State},
    http::header::HeaderMap,
    middleware::Next,
    response::Response,
    Extension, Json,
};
use coinmatch_common::db::models::User;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::{services, ApiError, AppState};

pub const SESSION_HEADER: &str = "X-Session-Token";

/// Authenticated user, injected into request extensions by the middleware
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.db.acquire().await?;
    let session = services::auth::authenticate(
        &mut conn,
        state.settings.token_expiry_minutes,
        &body.email,
        &body.password,
    )
    .await?;

    let Some((user, token)) = session else {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    };

    debug!(user_id = user.id, "Login succeeded");
    Ok(Json(json!({
        "token": token.id,
        "user": {
            "name": user.name,
            "email": user.email,
            "role": "curator",
        }
    })))
}

/// POST /api/logout: deletes the presented token
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>, ApiError> {
    if let Some(token) = headers.get(SESSION_HEADER).and_then(|v| v.to_str().ok()) {
        let mut conn = state.db.acquire().await?;
        crate::db::sessions::delete_token(&mut conn, token).await?;
    }
    Ok(Json(json!({ "status": "logged_out" })))
}

/// GET /api/user/profile
pub async fn get_profile(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<Value> {
    Json(json!({
        "name": user.name,
        "email": user.email,
        "role": "curator",
    }))
}

/// Middleware guarding the protected route tree: resolves the
/// `X-Session-Token` header to a non-expired session or rejects with 401.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing session token".to_string()))?;

    let mut conn = state.db.acquire().await?;
    let user = crate::db::sessions::get_user_by_token(&mut conn, token)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired session token".to_string()))?;
    drop(conn);

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}
