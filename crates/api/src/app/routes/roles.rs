//! Role registry endpoints. All admin-gated.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
};
use serde_json::json;

use warden_auth::{Action, RoleName, required_permission};
use warden_core::RoleId;

use crate::app::dto::{self, CreateRoleRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_roles).post(create_role))
        .route("/:id", delete(delete_role))
}

/// GET /role: all roles with their permissions, newest first.
pub async fn list_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    let read_admins = required_permission(Action::Read, RoleName::Admin);
    if let Err(err) = authz::require_permission(&services, &caller, &read_admins).await {
        return errors::error_response(err);
    }

    match services.roles_overview().await {
        Ok(roles) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": roles.iter().map(dto::role_detail_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(err) => errors::error_response(err),
    }
}

/// POST /role: create a role with permissions and optional members.
pub async fn create_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<CreateRoleRequest>,
) -> axum::response::Response {
    let create_admins = required_permission(Action::Create, RoleName::Admin);
    if let Err(err) = authz::require_permission(&services, &caller, &create_admins).await {
        return errors::error_response(err);
    }

    match services
        .create_role(body.name, body.permission_ids, body.user_ids)
        .await
    {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({
                "status": "success",
                "message": "Role created successfully!",
            })),
        )
            .into_response(),
        Err(err) => errors::error_response(err),
    }
}

/// DELETE /role/:id: blocked while any user holds the role.
pub async fn delete_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let delete_admins = required_permission(Action::Delete, RoleName::Admin);
    if let Err(err) = authz::require_permission(&services, &caller, &delete_admins).await {
        return errors::error_response(err);
    }

    let role_id: RoleId = match id.parse() {
        Ok(id) => id,
        Err(err) => return errors::error_response(err),
    };

    match services.remove_role(role_id).await {
        Ok(role) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": format!("Role '{}' deleted successfully", role.name),
            })),
        )
            .into_response(),
        Err(err) => errors::error_response(err),
    }
}
