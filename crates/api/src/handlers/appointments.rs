//! # Appointment Handlers
//!
//! Owner-only endpoints for creating, editing and removing slots. Every
//! handler requires a [`CurrentUser`] and passes its id to the lifecycle
//! engine, which performs the ownership check.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use miny_core::models::appointment::{Appointment, AppointmentForm, AppointmentView};
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    ApiState,
    middleware::{auth::CurrentUser, error_handling::AppError},
};

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
) -> Result<Json<Vec<AppointmentView>>, AppError> {
    let appointments = state.service.list_upcoming(user.user_id).await?;
    Ok(Json(appointments))
}

#[axum::debug_handler]
pub async fn create_appointments(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Json(form): Json<AppointmentForm>,
) -> Result<(StatusCode, Json<Vec<Appointment>>), AppError> {
    let created = state
        .service
        .create_appointments(user.user_id, &form)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
    Json(form): Json<AppointmentForm>,
) -> Result<Json<Appointment>, AppError> {
    let updated = state
        .service
        .update_appointment(id, user.user_id, &form)
        .await?;
    Ok(Json(updated))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.service.delete_appointment(id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn remove_partner(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Appointment>, AppError> {
    let reopened = state.service.remove_partner(id, user.user_id).await?;
    Ok(Json(reopened))
}

#[axum::debug_handler]
pub async fn remove_participant(
    State(state): State<Arc<ApiState>>,
    user: CurrentUser,
    Path((id, participant_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state
        .service
        .remove_participant(id, participant_id, user.user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
