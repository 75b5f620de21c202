use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/auth/register", post(handlers::account::register))
        .route("/api/auth/login", post(handlers::account::login))
        .route("/api/auth/logout", post(handlers::account::logout))
        .route("/api/me", get(handlers::account::me))
        .route("/api/me/dismiss", post(handlers::account::dismiss_banner))
}
