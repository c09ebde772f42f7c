//! Admin dashboard aggregates.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use warden_auth::{Action, RoleName, required_permission};

use crate::app::dto;
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new().route("/stats", get(stats))
}

/// GET /dashboard/stats: counts and recent signups.
pub async fn stats(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    let read_admins = required_permission(Action::Read, RoleName::Admin);
    if let Err(err) = authz::require_permission(&services, &caller, &read_admins).await {
        return errors::error_response(err);
    }

    match services.dashboard().await {
        Ok(stats) => {
            let mut body = dto::stats_to_json(&stats);
            body["status"] = json!("success");
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => errors::error_response(err),
    }
}
