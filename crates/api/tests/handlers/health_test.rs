use axum::http::StatusCode;
use serde_json::Value;

use crate::test_utils::TestContext;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "miny-api");
}

#[tokio::test]
async fn test_version() {
    let ctx = TestContext::new();
    let body = ctx.server.get("/version").await.json::<Value>();
    assert!(body["version"].is_string());
}
