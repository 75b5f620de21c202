use axum::{
    Json,
    extract::{Path, State},
};
use miny_core::models::appointment::{ClaimRequest, ClaimResponse, PublicPage};
use std::sync::Arc;
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Share page of an owner: their open slots from today on.
#[axum::debug_handler]
pub async fn get_public_page(
    State(state): State<Arc<ApiState>>,
    Path(slug): Path<String>,
) -> Result<Json<PublicPage>, AppError> {
    let page = state.service.list_public(&slug).await?;
    Ok(Json(page))
}

/// Claims a slot for the visitor; no account needed.
#[axum::debug_handler]
pub async fn claim_appointment(
    State(state): State<Arc<ApiState>>,
    Path((slug, id)): Path<(String, Uuid)>,
    Json(payload): Json<ClaimRequest>,
) -> Result<Json<ClaimResponse>, AppError> {
    let outcome = state.service.claim_by_slug(&slug, id, payload).await?;

    let response = ClaimResponse {
        appointment_id: outcome.appointment.id,
        is_group_date: outcome.notification.is_group_date,
        is_assigned: outcome.appointment.is_assigned,
        current_count: outcome.notification.current_count,
        max_participants: outcome.notification.max_participants,
    };

    Ok(Json(response))
}
