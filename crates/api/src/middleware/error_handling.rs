//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON bodies so every handler
//! reports failures the same way.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use miny_core::errors::MinyError;
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use miny_api::middleware::error_handling::AppError;
/// use miny_core::errors::MinyError;
///
/// async fn handler(found: bool) -> Result<Json<&'static str>, AppError> {
///     if !found {
///         return Err(AppError(MinyError::NotFound("Appointment".to_string())));
///     }
///     Ok(Json("ok"))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub MinyError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MinyError::NotFound(_) => StatusCode::NOT_FOUND,
            MinyError::Validation(_) => StatusCode::BAD_REQUEST,
            MinyError::Authentication(_) => StatusCode::UNAUTHORIZED,
            MinyError::Authorization(_) => StatusCode::FORBIDDEN,
            MinyError::AlreadyAssigned
            | MinyError::CapacityExceeded
            | MinyError::Conflict(_) => StatusCode::CONFLICT,
            MinyError::Database(_) | MinyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Request failed: {:#}", self.0);
        }

        let body = match &self.0 {
            MinyError::Validation(fields) => json!({
                "error": self.0.to_string(),
                "fields": fields,
            }),
            // Store details stay in the logs.
            MinyError::Database(_) => json!({ "error": "Temporary failure, please try again" }),
            _ => json!({ "error": self.0.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<MinyError> for AppError {
    fn from(err: MinyError) -> Self {
        AppError(err)
    }
}

/// Store failures surface as [`MinyError::Database`].
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(MinyError::Database(err))
    }
}

/// Maps a MinyError to an HTTP response
pub fn map_error(err: MinyError) -> Response {
    AppError(err).into_response()
}
