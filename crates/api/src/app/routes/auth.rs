//! Credential endpoints: login and registration. The only unauthenticated
//! routes besides the health probe.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use serde_json::json;

use crate::app::dto::{self, LoginRequest, RegisterRequest};
use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
}

/// POST /auth/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<LoginRequest>,
) -> axum::response::Response {
    match services.login(&body.email, &body.password).await {
        Ok((token, user)) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "token": token,
                "user": dto::user_to_json(&user),
            })),
        )
            .into_response(),
        Err(err) => errors::error_response(err),
    }
}

/// POST /auth/register
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<RegisterRequest>,
) -> axum::response::Response {
    match services
        .register(&body.name, &body.email, &body.password, body.kind)
        .await
    {
        Ok(user) => (
            StatusCode::CREATED,
            Json(json!({
                "status": "success",
                "message": "User registered successfully!",
                "user": dto::user_summary_to_json(&user),
            })),
        )
            .into_response(),
        Err(err) => errors::error_response(err),
    }
}
