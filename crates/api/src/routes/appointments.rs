use axum::{
    routing::{delete, get, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/appointments",
            get(handlers::appointments::list_appointments)
                .post(handlers::appointments::create_appointments),
        )
        .route(
            "/api/appointments/:id",
            put(handlers::appointments::update_appointment)
                .delete(handlers::appointments::delete_appointment),
        )
        .route(
            "/api/appointments/:id/partner",
            delete(handlers::appointments::remove_partner),
        )
        .route(
            "/api/appointments/:id/participants/:participant_id",
            delete(handlers::appointments::remove_participant),
        )
}
