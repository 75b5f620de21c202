use axum::http::StatusCode;
use miny_core::store::AccountStore;
use serde_json::{Value, json};

use crate::test_utils::{PASSWORD, TestContext, bearer};

#[tokio::test]
async fn test_register_returns_profile_and_share_url() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({
            "name": "Anna Müller",
            "email": " Anna@Example.com ",
            "password": PASSWORD
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let body = response.json::<Value>();
    assert_eq!(body["name"], "Anna Müller");
    assert_eq!(body["email"], "anna@example.com");
    assert_eq!(body["slug"], "anna-mueller");
    assert_eq!(body["share_url"], "https://miny.test/anna-mueller");
    assert_eq!(body["login_count"], 0);
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": " ", "email": "nope", "password": "short" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let fields: Vec<String> = response.json::<Value>()["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(fields, vec!["name", "email", "password"]);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let ctx = TestContext::new();
    ctx.register("Anna", "anna@example.com").await;

    let response = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "Other Anna", "email": "ANNA@example.com", "password": PASSWORD }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["fields"][0]["field"], "email");
}

#[tokio::test]
async fn test_same_name_gets_distinct_slug() {
    let ctx = TestContext::new();
    let first = ctx.register("Maria", "maria@example.com").await;
    let second = ctx.register("Maria", "maria2@example.com").await;

    assert_eq!(first["slug"], "maria");
    let slug = second["slug"].as_str().unwrap();
    assert!(slug.starts_with("maria-"));
    assert_eq!(slug.len(), "maria-".len() + 4);
}

#[tokio::test]
async fn test_login_counts_and_issues_session() {
    let ctx = TestContext::new();
    ctx.register("Maria", "maria@example.com").await;

    let response = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "maria@example.com", "password": PASSWORD }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["user"]["login_count"], 1);
    let token = body["token"].as_str().unwrap();

    let (name, value) = bearer(token);
    let me = ctx.server.get("/api/me").add_header(name, value).await;
    assert_eq!(me.status_code(), StatusCode::OK);
    assert_eq!(me.json::<Value>()["slug"], "maria");
}

#[tokio::test]
async fn test_login_with_wrong_password() {
    let ctx = TestContext::new();
    ctx.register("Maria", "maria@example.com").await;

    let wrong = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "maria@example.com", "password": "not the password" }))
        .await;
    assert_eq!(wrong.status_code(), StatusCode::UNAUTHORIZED);

    let unknown = ctx
        .server
        .post("/api/auth/login")
        .json(&json!({ "email": "ghost@example.com", "password": PASSWORD }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_requires_session() {
    let ctx = TestContext::new();

    let missing = ctx.server.get("/api/me").await;
    assert_eq!(missing.status_code(), StatusCode::UNAUTHORIZED);

    let (name, value) = bearer("not-a-session");
    let bogus = ctx.server.get("/api/me").add_header(name, value).await;
    assert_eq!(bogus.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;
    let user = ctx.store.find_user_by_slug("maria").await.unwrap().unwrap();

    ctx.store
        .create_session("stale", user.id, chrono::Utc::now() - chrono::Duration::minutes(1))
        .await
        .unwrap();

    let (name, value) = bearer("stale");
    let stale = ctx.server.get("/api/me").add_header(name, value).await;
    assert_eq!(stale.status_code(), StatusCode::UNAUTHORIZED);

    let (name, value) = bearer(&owner.token);
    let fresh = ctx.server.get("/api/me").add_header(name, value).await;
    assert_eq!(fresh.status_code(), StatusCode::OK);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;

    let (name, value) = bearer(&owner.token);
    let response = ctx
        .server
        .post("/api/auth/logout")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let (name, value) = bearer(&owner.token);
    let me = ctx.server.get("/api/me").add_header(name, value).await;
    assert_eq!(me.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_dismiss_banner() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;

    let (name, value) = bearer(&owner.token);
    let response = ctx
        .server
        .post("/api/me/dismiss")
        .add_header(name, value)
        .json(&json!({ "banner": "onboarding" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["onboarding_dismissed"], true);
    assert_eq!(body["news_dismissed"], false);
}

#[tokio::test]
async fn test_register_name_length_boundary() {
    let ctx = TestContext::new();

    let longest = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "a".repeat(255), "email": "a@example.com", "password": PASSWORD }))
        .await;
    assert_eq!(longest.status_code(), StatusCode::CREATED);
    assert!(longest.json::<Value>()["slug"].as_str().unwrap().len() <= 255);

    let too_long = ctx
        .server
        .post("/api/auth/register")
        .json(&json!({ "name": "b".repeat(256), "email": "b@example.com", "password": PASSWORD }))
        .await;
    assert_eq!(too_long.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(too_long.json::<Value>()["fields"][0]["field"], "name");
}

#[tokio::test]
async fn test_login_purges_expired_sessions() {
    let ctx = TestContext::new();
    ctx.register("Maria", "maria@example.com").await;
    let user = ctx.store.find_user_by_slug("maria").await.unwrap().unwrap();

    let expired_at = chrono::Utc::now() - chrono::Duration::minutes(1);
    ctx.store
        .create_session("stale", user.id, expired_at)
        .await
        .unwrap();

    ctx.login("maria@example.com").await;

    // Looked up at a time before its expiry, the row would still resolve.
    let before_expiry = expired_at - chrono::Duration::hours(1);
    assert_eq!(
        ctx.store
            .find_session_user("stale", before_expiry)
            .await
            .unwrap(),
        None
    );
}
