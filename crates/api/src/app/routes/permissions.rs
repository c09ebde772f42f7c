//! Permission registry endpoints. All admin-gated.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use warden_auth::{Action, RoleName, required_permission};
use warden_core::PermissionId;

use crate::app::dto::{self, CreatePermissionRequest};
use crate::app::errors;
use crate::app::services::AppServices;
use crate::authz;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_permissions).post(create_permission))
        .route("/:id", get(get_permission).delete(delete_permission))
}

/// GET /permission: all permissions, newest first.
pub async fn list_permissions(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
) -> axum::response::Response {
    let read_admins = required_permission(Action::Read, RoleName::Admin);
    if let Err(err) = authz::require_permission(&services, &caller, &read_admins).await {
        return errors::error_response(err);
    }

    match services.permissions_overview().await {
        Ok(permissions) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": permissions.iter().map(dto::permission_to_json).collect::<Vec<_>>(),
            })),
        )
            .into_response(),
        Err(err) => errors::error_response(err),
    }
}

/// POST /permission: create a uniquely-named permission.
pub async fn create_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<CreatePermissionRequest>,
) -> axum::response::Response {
    let create_admins = required_permission(Action::Create, RoleName::Admin);
    if let Err(err) = authz::require_permission(&services, &caller, &create_admins).await {
        return errors::error_response(err);
    }

    match services.create_permission(&body.name).await {
        Ok(_) => (
            StatusCode::CREATED,
            Json(json!({
                "status": "success",
                "message": "Permission created successfully!",
            })),
        )
            .into_response(),
        Err(err) => errors::error_response(err),
    }
}

/// GET /permission/:id: permission with the roles that hold it.
pub async fn get_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let read_admins = required_permission(Action::Read, RoleName::Admin);
    if let Err(err) = authz::require_permission(&services, &caller, &read_admins).await {
        return errors::error_response(err);
    }

    let permission_id: PermissionId = match id.parse() {
        Ok(id) => id,
        Err(err) => return errors::error_response(err),
    };

    match services.permission_detail(permission_id).await {
        Ok(detail) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "data": dto::permission_detail_to_json(&detail),
            })),
        )
            .into_response(),
        Err(err) => errors::error_response(err),
    }
}

/// DELETE /permission/:id: cascading detach from every holding role; the
/// response names the roles that changed.
pub async fn delete_permission(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let delete_admins = required_permission(Action::Delete, RoleName::Admin);
    if let Err(err) = authz::require_permission(&services, &caller, &delete_admins).await {
        return errors::error_response(err);
    }

    let permission_id: PermissionId = match id.parse() {
        Ok(id) => id,
        Err(err) => return errors::error_response(err),
    };

    match services.remove_permission(permission_id).await {
        Ok(affected) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Permission deleted successfully!",
                "affectedRoles": dto::affected_roles_to_json(&affected),
            })),
        )
            .into_response(),
        Err(err) => errors::error_response(err),
    }
}
