use axum::{body::to_bytes, http::StatusCode};
use miny_api::middleware::error_handling::map_error;
use miny_core::errors::{FieldErrors, MinyError};
use rstest::rstest;
use serde_json::Value;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[rstest]
#[case(MinyError::NotFound("Appointment".to_string()), StatusCode::NOT_FOUND)]
#[case(MinyError::validation("date", "Not in the future"), StatusCode::BAD_REQUEST)]
#[case(MinyError::Authentication("Please sign in".to_string()), StatusCode::UNAUTHORIZED)]
#[case(MinyError::Authorization("Not the owner".to_string()), StatusCode::FORBIDDEN)]
#[case(MinyError::AlreadyAssigned, StatusCode::CONFLICT)]
#[case(MinyError::CapacityExceeded, StatusCode::CONFLICT)]
#[case(MinyError::Conflict("Changed".to_string()), StatusCode::CONFLICT)]
#[case(MinyError::Database(eyre::eyre!("pool timed out")), StatusCode::INTERNAL_SERVER_ERROR)]
#[tokio::test]
async fn test_error_status_mapping(#[case] error: MinyError, #[case] status: StatusCode) {
    let response = map_error(error);
    assert_eq!(response.status(), status);
}

#[tokio::test]
async fn test_validation_body_lists_fields() {
    let mut fields = FieldErrors::new();
    fields.push("start_time", "Start time is required");
    fields.push("max_participants", "Maximum participants is required");

    let body = body_json(map_error(MinyError::Validation(fields))).await;

    assert_eq!(body["fields"][0]["field"], "start_time");
    assert_eq!(body["fields"][1]["field"], "max_participants");
    assert!(body["error"].as_str().unwrap().starts_with("Validation error"));
}

#[tokio::test]
async fn test_database_details_are_not_exposed() {
    let body = body_json(map_error(MinyError::Database(eyre::eyre!(
        "password authentication failed for user postgres"
    ))))
    .await;

    let message = body["error"].as_str().unwrap();
    assert!(!message.contains("postgres"));
}

#[tokio::test]
async fn test_claim_race_message() {
    let body = body_json(map_error(MinyError::AlreadyAssigned)).await;
    assert_eq!(body["error"], "This appointment is no longer available");
}
