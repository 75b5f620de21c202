use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new().route(
        "/api/calendar/:user_id",
        get(handlers::calendar::calendar_feed),
    )
}
