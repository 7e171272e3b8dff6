//! coinmatch-api library - HTTP backend for the CoinMatch provenance tracker
//!
//! Catalog browsing, marketplace-listing ingestion, heuristic match
//! generation, and the curator decision log, served over axum.

use axum::Router;
use coinmatch_common::config::Settings;
use sqlx::SqlitePool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod api;
pub mod db;
pub mod error;
pub mod services;

pub use error::ApiError;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Runtime configuration, resolved once at process entry
    pub settings: Settings,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, settings: Settings) -> Self {
        Self { db, settings }
    }
}

/// Build application router
///
/// Protected routes require a valid `X-Session-Token` header; the health
/// endpoint and login do not.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    let protected = Router::new()
        .route("/api/user/profile", get(api::auth::get_profile))
        .route("/api/logout", post(api::auth::logout))
        .route("/api/museum-coins", get(api::coins::list_coins))
        .route("/api/museum-coins/:coin_id", get(api::coins::coin_detail))
        .route("/api/match/save", post(api::matches::save_match))
        .route("/api/match/history", get(api::matches::match_history))
        .route("/api/search/text", post(api::search::search_text))
        .route("/api/search/image", post(api::search::search_image))
        .route("/api/search/jobs/:job_id", get(api::search::get_job))
        .route("/api/admin/sync", post(api::admin::sync_sources))
        .route("/api/admin/match", post(api::admin::run_matching))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::auth_middleware,
        ));

    let public = Router::new()
        .route("/api/login", post(api::auth::login))
        .merge(api::health::health_routes());

    let cors = cors_layer(&state.settings);

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<_> = settings
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any)
}
