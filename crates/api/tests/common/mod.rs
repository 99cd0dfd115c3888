//! Shared helpers for HTTP-level integration tests.
//!
//! [`build_test_app`] mirrors the router construction in `main.rs` so the
//! tests exercise the same middleware stack (CORS, request ID, timeout,
//! tracing, panic recovery) that production uses.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use roofline_api::config::ServerConfig;
use roofline_api::router::build_app_router;
use roofline_api::state::AppState;
use roofline_api::workflow::WorkflowService;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        persistence_timeout_ms: 5000,
        persistence_retry_backoff_ms: 50,
    }
}

/// Build the full application router over the given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let event_bus = Arc::new(roofline_events::EventBus::default());
    let workflow = Arc::new(WorkflowService::new(
        pool.clone(),
        Arc::clone(&event_bus),
        &config,
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus,
        workflow,
    };

    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(app: Router, method: Method, uri: &str, body: Option<serde_json::Value>) -> Response {
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

pub async fn get(app: Router, uri: &str) -> Response {
    send(app, Method::GET, uri, None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::POST, uri, Some(body)).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PUT, uri, Some(body)).await
}

pub async fn patch_json(app: Router, uri: &str, body: serde_json::Value) -> Response {
    send(app, Method::PATCH, uri, Some(body)).await
}

pub async fn delete(app: Router, uri: &str) -> Response {
    send(app, Method::DELETE, uri, None).await
}

/// Read a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

// ---------------------------------------------------------------------------
// Seeding helpers
// ---------------------------------------------------------------------------

/// Create a project via the API and return its JSON view.
pub async fn create_project(app: Router, customer_name: &str) -> serde_json::Value {
    let response = post_json(
        app,
        "/api/v1/projects",
        serde_json::json!({
            "calculation_id": null,
            "address": "Ringvägen 12, Uppsala",
            "customer_name": customer_name,
            "customer_phone": "+46 70 123 45 67",
        }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await
}

/// Insert a team directly in the database.
pub async fn seed_team(pool: &PgPool, code: &str, name: &str, color: &str) {
    roofline_db::repositories::TeamRepo::create(
        pool,
        &roofline_db::models::team::CreateTeam {
            code: code.to_string(),
            name: name.to_string(),
            color: color.to_string(),
        },
    )
    .await
    .expect("team creation should succeed");
}
