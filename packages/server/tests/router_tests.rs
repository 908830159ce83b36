//! Router-level tests: health, service index, CORS, and the 404 fallback.

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use serde_json::Value;
use tower::ServiceExt;

use crate::common::{fixture_config, TestServer};
use scrape_server::server::{build_app, AppState};

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn app() -> axum::Router {
    build_app(AppState::new(fixture_config("success")))
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let server = TestServer::with_fixture("success").await;

    let resp = server.get("/api/health").await;

    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["status"], "ok");
    assert!(body["uptime"].as_f64().unwrap() >= 0.0);
    let timestamp = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(timestamp).is_ok());
}

#[tokio::test]
async fn index_lists_endpoints() {
    let response = app()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "Running");
    assert_eq!(body["endpoints"]["scrape"], "POST /api/scrape");
    assert_eq!(body["endpoints"]["health"], "GET /api/health");
}

#[tokio::test]
async fn unknown_route_is_a_json_404() {
    let response = app()
        .oneshot(Request::get("/api/unknown").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response).await;
    assert_eq!(body["error_code"], "NOT_FOUND");
    assert_eq!(body["message"], "Endpoint not found.");
}

#[tokio::test]
async fn cors_preflight_is_answered() {
    let response = app()
        .oneshot(
            Request::builder()
                .method("OPTIONS")
                .uri("/api/scrape")
                .header("origin", "https://frontend.example.com")
                .header("access-control-request-method", "POST")
                .header("access-control-request-headers", "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(methods.contains("POST"));
}

#[tokio::test]
async fn responses_carry_cors_origin() {
    let response = app()
        .oneshot(
            Request::get("/api/health")
                .header("origin", "https://frontend.example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.headers()["access-control-allow-origin"], "*");
}
