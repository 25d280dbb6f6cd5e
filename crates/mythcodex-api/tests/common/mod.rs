//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::TimeZone;
use http_body_util::BodyExt;
use tower::ServiceExt;
use uuid::Uuid;

use mythcodex_crossover::repository::CrossoverRepository;
use mythcodex_test_support::{FixedClock, InMemoryCrossoverRepository};

use mythcodex_api::routes;
use mythcodex_api::state::AppState;

pub use mythcodex_api::auth::USER_ID_HEADER;

/// Fixed timestamp used across all integration tests.
pub fn fixed_clock() -> FixedClock {
    FixedClock(
        chrono::Utc
            .with_ymd_and_hms(2026, 1, 15, 10, 0, 0)
            .unwrap(),
    )
}

/// Build the full app router around an in-memory repository and a
/// deterministic clock. Uses the same route structure as `main.rs`.
pub fn build_test_app(repository: Arc<InMemoryCrossoverRepository>) -> Router {
    let repository: Arc<dyn CrossoverRepository> = repository;
    let app_state = AppState::new(repository, Arc::new(fixed_clock()));

    Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/crossovers", routes::crossover::router())
        .with_state(app_state)
}

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    caller: Option<Uuid>,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(caller) = caller {
        builder = builder.header(USER_ID_HEADER, caller.to_string());
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Send a GET request as `caller` and return the response.
pub async fn get_json(app: Router, caller: Uuid, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, Some(caller), None).await
}

/// Send a GET request with no identity header and return the response.
pub async fn get_json_anonymous(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None, None).await
}

/// Send a POST request with a JSON body as `caller` and return the response.
pub async fn post_json(
    app: Router,
    caller: Uuid,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(caller), Some(body)).await
}

/// Send a PATCH request with a JSON body as `caller` and return the response.
pub async fn patch_json(
    app: Router,
    caller: Uuid,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "PATCH", uri, Some(caller), Some(body)).await
}

/// Send a DELETE request as `caller` and return the response.
pub async fn delete_json(app: Router, caller: Uuid, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", uri, Some(caller), None).await
}
