use axum::http::StatusCode;
use miny_core::store::AppointmentStore;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{TestContext, bearer};

fn single(date: &str) -> Value {
    json!({
        "dates": [date],
        "start_time": "10:00",
        "end_time": "12:00"
    })
}

fn group(date: &str, max: i64) -> Value {
    json!({
        "dates": [date],
        "start_time": "18:00",
        "is_group_date": true,
        "max_participants": max
    })
}

fn id_of(appointment: &Value) -> Uuid {
    appointment["id"].as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_create_and_list_appointments() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;

    let (name, value) = bearer(&owner.token);
    let response = ctx
        .server
        .post("/api/appointments")
        .add_header(name, value)
        .json(&json!({
            "dates": [ctx.day(2), ctx.day(1)],
            "is_flexible": true,
            "start_time": "Afternoon",
            "note": " Meet at the entrance ",
            "is_video_call": true
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::CREATED);
    let created = response.json::<Vec<Value>>();
    assert_eq!(created.len(), 2);
    assert_eq!(created[0]["date"], ctx.day(1));
    assert_eq!(created[0]["time"]["mode"], "flexible");
    assert_eq!(created[0]["note"], "Meet at the entrance");

    let (name, value) = bearer(&owner.token);
    let listed = ctx
        .server
        .get("/api/appointments")
        .add_header(name, value)
        .await
        .json::<Vec<Value>>();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0]["participants"], json!([]));
    assert_eq!(listed[1]["date"], ctx.day(2));
}

#[tokio::test]
async fn test_create_requires_session() {
    let ctx = TestContext::new();
    let response = ctx
        .server
        .post("/api/appointments")
        .json(&single(&ctx.day(1)))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_for_yesterday_is_rejected() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;

    let (name, value) = bearer(&owner.token);
    let response = ctx
        .server
        .post("/api/appointments")
        .add_header(name, value)
        .json(&single(&ctx.day(-1)))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["fields"][0]["field"], "date");

    let (name, value) = bearer(&owner.token);
    let listed = ctx
        .server
        .get("/api/appointments")
        .add_header(name, value)
        .await
        .json::<Vec<Value>>();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_group_capacity_bounds_over_http() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;

    for (max, expected) in [
        (1, StatusCode::BAD_REQUEST),
        (2, StatusCode::CREATED),
        (101, StatusCode::BAD_REQUEST),
    ] {
        let (name, value) = bearer(&owner.token);
        let response = ctx
            .server
            .post("/api/appointments")
            .add_header(name, value)
            .json(&group(&ctx.day(1), max))
            .await;
        assert_eq!(response.status_code(), expected, "max_participants = {}", max);
    }
}

#[tokio::test]
async fn test_update_by_owner() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;
    let created = ctx.create(&owner, single(&ctx.day(1))).await;
    let id = id_of(&created[0]);

    let (name, value) = bearer(&owner.token);
    let response = ctx
        .server
        .put(&format!("/api/appointments/{}", id))
        .add_header(name, value)
        .json(&json!({
            "dates": [ctx.day(3)],
            "start_time": "08:15",
            "end_time": "09:00"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body = response.json::<Value>();
    assert_eq!(body["date"], ctx.day(3));
    assert_eq!(body["time"]["start"], "08:15:00");
}

#[tokio::test]
async fn test_update_by_non_owner_is_forbidden() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;
    let intruder = ctx.owner("Jonas", "jonas@example.com").await;
    let created = ctx.create(&owner, single(&ctx.day(1))).await;
    let id = id_of(&created[0]);

    let (name, value) = bearer(&intruder.token);
    let response = ctx
        .server
        .put(&format!("/api/appointments/{}", id))
        .add_header(name, value)
        .json(&single(&ctx.day(5)))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    let stored = ctx.store.find_appointment(id).await.unwrap().unwrap();
    assert_eq!(stored.date.to_string(), ctx.day(1));
}

#[tokio::test]
async fn test_delete_appointment() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;
    let intruder = ctx.owner("Jonas", "jonas@example.com").await;
    let created = ctx.create(&owner, single(&ctx.day(1))).await;
    let id = id_of(&created[0]);

    let (name, value) = bearer(&intruder.token);
    let denied = ctx
        .server
        .delete(&format!("/api/appointments/{}", id))
        .add_header(name, value)
        .await;
    assert_eq!(denied.status_code(), StatusCode::FORBIDDEN);

    let (name, value) = bearer(&owner.token);
    let deleted = ctx
        .server
        .delete(&format!("/api/appointments/{}", id))
        .add_header(name, value)
        .await;
    assert_eq!(deleted.status_code(), StatusCode::NO_CONTENT);
    assert!(ctx.store.find_appointment(id).await.unwrap().is_none());

    let (name, value) = bearer(&owner.token);
    let missing = ctx
        .server
        .delete(&format!("/api/appointments/{}", id))
        .add_header(name, value)
        .await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_remove_participant_and_partner() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;
    let single_id = id_of(&ctx.create(&owner, single(&ctx.day(1))).await[0]);
    let group_id = id_of(&ctx.create(&owner, group(&ctx.day(2), 2)).await[0]);

    for (id, name) in [(single_id, "Anna"), (group_id, "Ben"), (group_id, "Carl")] {
        let response = ctx
            .server
            .post(&format!(
                "/api/public/{}/appointments/{}/claim",
                owner.slug, id
            ))
            .json(&json!({ "name": name }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let (name, value) = bearer(&owner.token);
    let listed = ctx
        .server
        .get("/api/appointments")
        .add_header(name, value)
        .await
        .json::<Vec<Value>>();
    let participant_id = listed[1]["participants"][0]["id"].as_str().unwrap().to_string();

    let (name, value) = bearer(&owner.token);
    let removed = ctx
        .server
        .delete(&format!(
            "/api/appointments/{}/participants/{}",
            group_id, participant_id
        ))
        .add_header(name, value)
        .await;
    assert_eq!(removed.status_code(), StatusCode::NO_CONTENT);

    // The group stays closed until the owner edits it.
    let group = ctx.store.find_appointment(group_id).await.unwrap().unwrap();
    assert!(group.is_assigned);
    assert_eq!(ctx.store.count_participants(group_id).await.unwrap(), 1);

    let (name, value) = bearer(&owner.token);
    let reopened = ctx
        .server
        .delete(&format!("/api/appointments/{}/partner", single_id))
        .add_header(name, value)
        .await;
    assert_eq!(reopened.status_code(), StatusCode::OK);
    let body = reopened.json::<Value>();
    assert_eq!(body["is_assigned"], false);
    assert_eq!(body["kind"]["partner_name"], Value::Null);
}
