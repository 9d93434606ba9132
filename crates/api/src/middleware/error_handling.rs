//! # Error Handling Middleware
//!
//! Maps domain errors to HTTP status codes and JSON error bodies so every
//! handler reports failures the same way.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rollcall_core::errors::RollcallError;
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// Handlers return `Result<_, AppError>` and use `?` on service calls.
///
/// ```
/// use axum::Json;
/// use rollcall_api::middleware::error_handling::AppError;
/// use rollcall_core::errors::RollcallError;
///
/// async fn handler() -> Result<Json<()>, AppError> {
///     Err(RollcallError::NotFound("schedule not found".to_string()).into())
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub RollcallError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            RollcallError::NotFound(_) => StatusCode::NOT_FOUND,
            RollcallError::Validation(_) => StatusCode::BAD_REQUEST,
            RollcallError::Conflict(_) => StatusCode::CONFLICT,
            RollcallError::Authentication(_) => StatusCode::UNAUTHORIZED,
            RollcallError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            RollcallError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Storage failures are logged in full and reported generically
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self.0);
            "Internal server error".to_string()
        } else {
            self.0.to_string()
        };
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

impl From<RollcallError> for AppError {
    fn from(err: RollcallError) -> Self {
        AppError(err)
    }
}

/// Wraps a bare report as a database failure.
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(RollcallError::Database(err))
    }
}

/// Maps a RollcallError straight to an HTTP response
pub fn map_error(err: RollcallError) -> Response {
    AppError(err).into_response()
}
