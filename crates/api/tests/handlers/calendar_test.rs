use axum::http::{StatusCode, header::CONTENT_TYPE};
use serde_json::json;
use uuid::Uuid;

use crate::test_utils::TestContext;

#[tokio::test]
async fn test_calendar_feed() {
    let ctx = TestContext::new();
    let owner = ctx.owner("Maria", "maria@example.com").await;
    ctx.create(
        &owner,
        json!({
            "dates": [ctx.day(1)],
            "is_flexible": true,
            "start_time": "Morning",
            "is_video_call": true
        }),
    )
    .await;

    let response = ctx
        .server
        .get(&format!("/api/calendar/{}", owner.id))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.header(CONTENT_TYPE),
        "text/calendar; charset=utf-8"
    );
    let ics = response.text();
    assert!(ics.contains("BEGIN:VEVENT"));
    assert!(ics.contains("DTSTART:20260302T090000"));
    assert!(ics.contains("DURATION:PT2H"));
    assert!(ics.contains("SUMMARY:Open"));
    assert!(ics.contains("LOCATION:Video call"));
    assert!(ics.contains("TRIGGER:-PT30M"));
}

#[tokio::test]
async fn test_calendar_feed_unknown_owner() {
    let ctx = TestContext::new();
    let response = ctx
        .server
        .get(&format!("/api/calendar/{}", Uuid::new_v4()))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
