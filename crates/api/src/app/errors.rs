use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use warden_core::AppError;

/// The single place where error kinds become HTTP status codes.
pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
        AppError::Authorization(_) => StatusCode::FORBIDDEN,
        AppError::NotFound(_) => StatusCode::NOT_FOUND,
        AppError::Conflict(_) => StatusCode::CONFLICT,
        AppError::InUse(_) => StatusCode::BAD_REQUEST,
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn error_response(err: AppError) -> Response {
    let status = status_for(&err);
    if status.is_server_error() {
        tracing::error!(error = %err, "request failed");
    }

    (
        status,
        Json(json!({
            "status": "error",
            "message": err.to_string(),
        })),
    )
        .into_response()
}
