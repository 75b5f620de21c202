use std::future::IntoFuture;

use axum::http::StatusCode;
use miny_core::store::AppointmentStore;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::TestContext;

fn claim_path(slug: &str, id: &Value) -> String {
    format!(
        "/api/public/{}/appointments/{}/claim",
        slug,
        id.as_str().unwrap()
    )
}

#[test_log::test(tokio::test)]
async fn test_claim_single_appointment() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;
    let created = ctx
        .create(
            &owner,
            json!({ "dates": [ctx.day(1)], "start_time": "10:00", "end_time": "12:00" }),
        )
        .await;

    let response = ctx
        .server
        .post(&claim_path(&owner.slug, &created[0]["id"]))
        .json(&json!({ "name": " Anna ", "message": "Looking forward" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["is_assigned"], true);
    assert_eq!(body["is_group_date"], false);

    let sent = ctx.notifier.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].partner_name, "Anna");
    assert_eq!(sent[0].recipient_email, "maria@example.com");
    assert_eq!(sent[0].message.as_deref(), Some("Looking forward"));

    let again = ctx
        .server
        .post(&claim_path(&owner.slug, &created[0]["id"]))
        .json(&json!({ "name": "Ben" }))
        .await;
    assert_eq!(again.status_code(), StatusCode::CONFLICT);
    assert_eq!(
        again.json::<Value>()["error"],
        "This appointment is no longer available"
    );
}

#[tokio::test]
async fn test_group_claims_until_full() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;
    let created = ctx
        .create(
            &owner,
            json!({
                "dates": [ctx.day(1)],
                "start_time": "18:00",
                "is_group_date": true,
                "max_participants": 2
            }),
        )
        .await;
    let path = claim_path(&owner.slug, &created[0]["id"]);

    let first = ctx
        .server
        .post(&path)
        .json(&json!({ "name": "Anna" }))
        .await
        .json::<Value>();
    assert_eq!(first["current_count"], 1);
    assert_eq!(first["max_participants"], 2);
    assert_eq!(first["is_assigned"], false);

    let second = ctx
        .server
        .post(&path)
        .json(&json!({ "name": "Ben" }))
        .await
        .json::<Value>();
    assert_eq!(second["current_count"], 2);
    assert_eq!(second["is_assigned"], true);

    let third = ctx
        .server
        .post(&path)
        .json(&json!({ "name": "Carl" }))
        .await;
    assert_eq!(third.status_code(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_simultaneous_claims_over_http() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;
    let created = ctx
        .create(&owner, json!({ "dates": [ctx.day(1)], "start_time": "10:00" }))
        .await;
    let path = claim_path(&owner.slug, &created[0]["id"]);

    let anna = ctx
        .server
        .post(&path)
        .json(&json!({ "name": "Anna" }))
        .into_future();
    let ben = ctx
        .server
        .post(&path)
        .json(&json!({ "name": "Ben" }))
        .into_future();
    let (anna, ben) = tokio::join!(anna, ben);

    let statuses = [anna.status_code(), ben.status_code()];
    assert_eq!(statuses.iter().filter(|s| **s == StatusCode::OK).count(), 1);
    assert_eq!(
        statuses
            .iter()
            .filter(|s| **s == StatusCode::CONFLICT)
            .count(),
        1
    );
    assert_eq!(ctx.notifier.sent().await.len(), 1);
}

#[tokio::test]
async fn test_claim_validation_and_lookup_errors() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;
    let other = ctx.owner("Jonas", "jonas@example.com").await;
    let created = ctx
        .create(&owner, json!({ "dates": [ctx.day(1)], "start_time": "10:00" }))
        .await;

    let blank = ctx
        .server
        .post(&claim_path(&owner.slug, &created[0]["id"]))
        .json(&json!({ "name": "   " }))
        .await;
    assert_eq!(blank.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(blank.json::<Value>()["fields"][0]["field"], "name");

    let wrong_owner = ctx
        .server
        .post(&claim_path(&other.slug, &created[0]["id"]))
        .json(&json!({ "name": "Anna" }))
        .await;
    assert_eq!(wrong_owner.status_code(), StatusCode::NOT_FOUND);

    let unknown = ctx
        .server
        .post(&format!(
            "/api/public/{}/appointments/{}/claim",
            owner.slug,
            Uuid::new_v4()
        ))
        .json(&json!({ "name": "Anna" }))
        .await;
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);

    let id: Uuid = created[0]["id"].as_str().unwrap().parse().unwrap();
    let stored = ctx.store.find_appointment(id).await.unwrap().unwrap();
    assert!(!stored.is_assigned);
    assert!(ctx.notifier.sent().await.is_empty());
}

#[tokio::test]
async fn test_public_page_shows_open_slots() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;
    let created = ctx
        .create(
            &owner,
            json!({ "dates": [ctx.day(1), ctx.day(2)], "start_time": "10:00" }),
        )
        .await;
    ctx.server
        .post(&claim_path(&owner.slug, &created[0]["id"]))
        .json(&json!({ "name": "Anna" }))
        .await;

    let response = ctx.server.get(&format!("/api/public/{}", owner.slug)).await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let page = response.json::<Value>();
    assert_eq!(page["owner_name"], "Maria");
    let slots = page["appointments"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["id"], created[1]["id"]);
    assert!(slots[0].get("partner_name").is_none());

    let missing = ctx.server.get("/api/public/nobody").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_claimant_name_length_boundary() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;
    let created = ctx
        .create(&owner, json!({ "dates": [ctx.day(1)], "start_time": "10:00" }))
        .await;

    let too_long = ctx
        .server
        .post(&claim_path(&owner.slug, &created[0]["id"]))
        .json(&json!({ "name": "ö".repeat(256) }))
        .await;
    assert_eq!(too_long.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(too_long.json::<Value>()["fields"][0]["field"], "name");
    assert!(ctx.notifier.sent().await.is_empty());

    let longest = ctx
        .server
        .post(&claim_path(&owner.slug, &created[0]["id"]))
        .json(&json!({ "name": "ö".repeat(255) }))
        .await;
    assert_eq!(longest.status_code(), StatusCode::OK);
    let id = Uuid::parse_str(created[0]["id"].as_str().unwrap()).unwrap();
    let stored = ctx.store.find_appointment(id).await.unwrap().unwrap();
    assert_eq!(stored.kind.partner_name(), Some("ö".repeat(255).as_str()));
}
