//! Integration tests for the coinmatch-api HTTP surface
//!
//! Tests cover:
//! - Health endpoint (no auth required)
//! - Session-token middleware (401 without / with bad token)
//! - Login / profile / logout flow
//! - Catalog listing and detail
//! - Match decisions and history
//! - Batch match generation
//! - Candidate search and job lookup

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use coinmatch_api::{build_router, AppState};
use coinmatch_common::config::Settings;
use coinmatch_common::db::models::{
    merge_museum_coin, merge_online_coin, MuseumCoinPatch, OnlineCoinPatch,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

const SESSION_HEADER: &str = "X-Session-Token";

/// Test helper: in-memory database with the full schema and seed data
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    coinmatch_common::db::create_schema(&pool)
        .await
        .expect("schema creation");

    let mut conn = pool.acquire().await.unwrap();
    coinmatch_api::db::users::insert_user(&mut conn, "curator@museum.example", "Ada", "hunter2")
        .await
        .unwrap();

    let patch = MuseumCoinPatch {
        mint: Some("Syracuse".to_string()),
        authority: Some("Hieron II".to_string()),
        denomination: Some("Tetradrachm".to_string()),
        metal: Some("Silver".to_string()),
        catalog_number: Some("BM 1841,0726.288".to_string()),
        ..Default::default()
    };
    let coin = merge_museum_coin(None, "coin-1", patch, "2026-01-01T00:00:00Z");
    coinmatch_api::db::coins::save_coin(&mut conn, &coin)
        .await
        .unwrap();

    let patch = OnlineCoinPatch {
        mint: Some("Syracuse".to_string()),
        authority: Some("Hieron II".to_string()),
        denomination: Some("Tetradrachm".to_string()),
        metal: Some("Silver".to_string()),
        listing_reference: Some("CNG Triton XXVII, Lot 112".to_string()),
        ..Default::default()
    };
    let cand = merge_online_coin(None, "cand-1", patch, "2026-01-02T00:00:00Z");
    coinmatch_api::db::candidates::save_candidate(&mut conn, &cand)
        .await
        .unwrap();

    pool
}

fn setup_app(db: SqlitePool) -> axum::Router {
    let state = AppState::new(db, Settings::default());
    build_router(state)
}

async fn login(app: &axum::Router) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": "curator@museum.example", "password": "hunter2" }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    body["token"].as_str().expect("token in response").to_string()
}

fn get_with_token(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(SESSION_HEADER, token)
        .body(Body::empty())
        .unwrap()
}

fn post_json_with_token(uri: &str, token: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(SESSION_HEADER, token)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

#[tokio::test]
async fn test_health_endpoint_no_auth_required() {
    let app = setup_app(setup_test_db().await);

    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "coinmatch-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = setup_app(setup_test_db().await);

    let request = Request::builder()
        .method("GET")
        .uri("/api/museum-coins")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(get_with_token("/api/museum-coins", "not-a-real-token"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_rejects_bad_credentials() {
    let app = setup_app(setup_test_db().await);

    let request = Request::builder()
        .method("POST")
        .uri("/api/login")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({ "email": "curator@museum.example", "password": "wrong" }).to_string(),
        ))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_login_profile_logout_flow() {
    let app = setup_app(setup_test_db().await);
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(get_with_token("/api/user/profile", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["email"], "curator@museum.example");
    assert_eq!(body["role"], "curator");

    let response = app
        .clone()
        .oneshot(post_json_with_token("/api/logout", &token, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Token is dead after logout
    let response = app
        .oneshot(get_with_token("/api/user/profile", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_coin_list_and_detail() {
    let app = setup_app(setup_test_db().await);
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(get_with_token("/api/museum-coins?mint=syra", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    let coins = body.as_array().expect("array of coins");
    assert_eq!(coins.len(), 1);
    assert_eq!(coins[0]["coin_id"], "coin-1");

    let response = app
        .clone()
        .oneshot(get_with_token("/api/museum-coins/coin-1", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["mint"], "Syracuse");
    assert_eq!(body["catalog_number"], "BM 1841,0726.288");

    let response = app
        .oneshot(get_with_token("/api/museum-coins/no-such-coin", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_match_then_history() {
    let app = setup_app(setup_test_db().await);
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(post_json_with_token("/api/admin/match", &token, json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["matches_updated"], 1);

    let response = app
        .oneshot(get_with_token("/api/match/history", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["total"], 1);
    let items = body["items"].as_array().unwrap();
    assert_eq!(items[0]["coinId"], "coin-1");
    assert_eq!(items[0]["candidateId"], "cand-1");
    assert_eq!(items[0]["status"], "Pending");
    // Full attribute overlap: 0.35 + 0.30 + 0.25 + 0.10, clamped to the ceiling
    assert_eq!(items[0]["similarityScore"], 0.99);
}

#[tokio::test]
async fn test_save_match_decision() {
    let app = setup_app(setup_test_db().await);
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(post_json_with_token(
            "/api/match/save",
            &token,
            json!({
                "museum_coin_id": "coin-1",
                "candidate_id": "cand-1",
                "decision": "accept",
                "notes": "Obverse die match."
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "Accepted");
    assert_eq!(body["coinId"], "coin-1");
    assert_eq!(body["notes"], "Obverse die match.");
    assert_eq!(body["museumCoinTitle"], "BM 1841,0726.288");
    assert_eq!(body["candidateTitle"], "CNG Triton XXVII, Lot 112");

    // Unknown coin -> 404
    let response = app
        .oneshot(post_json_with_token(
            "/api/match/save",
            &token,
            json!({ "museum_coin_id": "no-such-coin", "decision": "accept" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_search_text_and_job_lookup() {
    let app = setup_app(setup_test_db().await);
    let token = login(&app).await;

    let response = app
        .clone()
        .oneshot(post_json_with_token(
            "/api/search/text",
            &token,
            json!({ "query": "triton" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "completed");
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["id"], "cand-1");
    // Linker anchors unlinked candidates to the first catalog coin
    assert_eq!(results[0]["museumCoinId"], "coin-1");

    let job_id = body["job_id"].as_str().unwrap().to_string();
    let response = app
        .clone()
        .oneshot(get_with_token(&format!("/api/search/jobs/{}", job_id), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "completed");

    // Unknown job id reports status "unknown", not 404
    let response = app
        .oneshot(get_with_token("/api/search/jobs/nope", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "unknown");
}
