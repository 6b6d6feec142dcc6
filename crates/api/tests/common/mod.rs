#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use starquest_api::config::ServerConfig;
use starquest_api::router::build_app_router;
use starquest_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        log_json: false,
        database_url: String::new(),
        db_max_connections: 5,
        db_acquire_timeout_secs: 5,
    }
}

/// Build the full application router, middleware included, over `pool`.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config).unwrap()
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::POST, uri, None).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Create a seeker through the API and return its id.
pub async fn create_seeker(pool: &PgPool, name: &str, pin: &str) -> String {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/seekers",
        serde_json::json!({ "name": name, "pin": pin }),
    )
    .await;
    assert_eq!(response.status(), 201, "seeker fixture should be created");
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Create an `active` quest assigned to `seeker_id` and return its id.
pub async fn create_quest(pool: &PgPool, seeker_id: &str, reward: i64) -> String {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/quests",
        serde_json::json!({
            "title": "Tidy room",
            "description": "Toys in the box",
            "reward": reward,
            "duration": "15 min",
            "assigned_to": seeker_id,
        }),
    )
    .await;
    assert_eq!(response.status(), 201, "quest fixture should be created");
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Create a prize and return its id.
pub async fn create_prize(pool: &PgPool, name: &str, cost: i64) -> String {
    let response = post_json(
        build_test_app(pool.clone()),
        "/api/prizes",
        serde_json::json!({ "name": name, "stars_cost": cost }),
    )
    .await;
    assert_eq!(response.status(), 201, "prize fixture should be created");
    body_json(response).await["id"].as_str().unwrap().to_string()
}

/// Drive a quest through start, complete, and approve.
pub async fn earn(pool: &PgPool, seeker_id: &str, reward: i64) -> String {
    let quest_id = create_quest(pool, seeker_id, reward).await;
    for step in ["start", "complete", "approve"] {
        let response = post_json(
            build_test_app(pool.clone()),
            &format!("/api/quests/{quest_id}/{step}"),
            serde_json::json!({ "seeker_id": seeker_id }),
        )
        .await;
        assert_eq!(response.status(), 200, "{step} should succeed");
    }
    quest_id
}

/// Read a seeker's derived balance through the API.
pub async fn balance(pool: &PgPool, seeker_id: &str) -> i64 {
    let response = get(build_test_app(pool.clone()), &format!("/api/seekers/{seeker_id}")).await;
    body_json(response).await["stars"].as_i64().unwrap()
}
