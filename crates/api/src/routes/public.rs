use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/public/:slug", get(handlers::public::get_public_page))
        .route(
            "/api/public/:slug/appointments/:id/claim",
            post(handlers::public::claim_appointment),
        )
}
