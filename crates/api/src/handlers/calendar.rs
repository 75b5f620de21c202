use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::{ApiState, middleware::error_handling::AppError};

/// Subscribable iCalendar feed of an owner's upcoming appointments.
#[axum::debug_handler]
pub async fn calendar_feed(
    State(state): State<Arc<ApiState>>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let ics = state.service.calendar_feed(user_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "inline; filename=\"miny.ics\""),
        ],
        ics,
    ))
}
