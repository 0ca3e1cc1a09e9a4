//! Health Check API Tests

use axum::{body::to_bytes, http::StatusCode};
use pretty_assertions::assert_eq;

use crate::common::TestApp;

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new();

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["message"], "Server is running");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new();

    let response = app.get("/health/live").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "alive");
}

#[tokio::test]
async fn test_readiness_reports_database_outage() {
    let app = TestApp::new();
    let _client = app.connect(1);

    let response = app.get("/health/ready").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = json_body(response).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["checks"]["realtime"]["active_connections"], 1);
    assert_eq!(body["checks"]["realtime"]["online_users"], 1);
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_realtime_gauges() {
    let app = TestApp::new();
    let _client = app.connect(1);

    let response = app.get("/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("chat_backend_websocket_connections_active"));
    assert!(text.contains("chat_backend_online_users"));
}
