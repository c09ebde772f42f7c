//! User directory endpoints.
//!
//! Listing is row-filtered by the caller's permission set; role assignment
//! and deletion carry a second, kind-scoped authorization check inside the
//! service layer.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use serde_json::json;

use warden_auth::{Action, RoleName, required_permission};
use warden_core::UserId;
use warden_registry::PageRequest;

use crate::app::dto::{self, AssignRoleRequest, ListUsersQuery, UpdateProfileRequest};
use crate::app::errors;
use crate::app::services::{AppServices, AssignOutcome};
use crate::authz;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_users).put(assign_role))
        .route("/profile", put(update_profile))
        .route("/:id", get(get_user).delete(delete_user))
}

/// GET /user?page&pageSize: paginated, type-filtered listing.
pub async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<ListUsersQuery>,
) -> axum::response::Response {
    let access = match authz::caller_access(&services, &caller).await {
        Ok(access) => access,
        Err(err) => return errors::error_response(err),
    };

    let page = PageRequest::new(query.page, query.page_size);
    match services.users_page(&page, &access).await {
        Ok(page) => (StatusCode::OK, Json(dto::user_page_to_json(&page))).into_response(),
        Err(err) => errors::error_response(err),
    }
}

/// GET /user/:id: single user with roles and permissions.
pub async fn get_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let read_users = required_permission(Action::Read, RoleName::User);
    if let Err(err) = authz::require_permission(&services, &caller, &read_users).await {
        return errors::error_response(err);
    }

    let user_id: UserId = match id.parse() {
        Ok(id) => id,
        Err(err) => return errors::error_response(err),
    };

    match services.user_detail(user_id).await {
        Ok(detail) => (StatusCode::OK, Json(dto::user_access_to_json(&detail))).into_response(),
        Err(err) => errors::error_response(err),
    }
}

/// PUT /user/: assign a role to a user.
pub async fn assign_role(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<AssignRoleRequest>,
) -> axum::response::Response {
    let read_users = required_permission(Action::Read, RoleName::User);
    let access = match authz::require_permission(&services, &caller, &read_users).await {
        Ok(access) => access,
        Err(err) => return errors::error_response(err),
    };

    match services
        .assign_role(body.user_id, body.role_id, &access)
        .await
    {
        Ok(AssignOutcome::Assigned) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "User edited successfully!",
            })),
        )
            .into_response(),
        Ok(AssignOutcome::AlreadyHeld) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "User already has this role.",
            })),
        )
            .into_response(),
        Err(err) => errors::error_response(err),
    }
}

/// PUT /user/profile: update the caller's own name/email.
pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<UpdateProfileRequest>,
) -> axum::response::Response {
    let access = match authz::caller_access(&services, &caller).await {
        Ok(access) => access,
        Err(err) => return errors::error_response(err),
    };

    match services
        .update_profile(access.user.id, body.name, body.email)
        .await
    {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "Profile updated successfully!",
            })),
        )
            .into_response(),
        Err(err) => errors::error_response(err),
    }
}

/// DELETE /user/:id: remove a user; gated on the delete permission for the
/// target's kind.
pub async fn delete_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let access = match authz::caller_access(&services, &caller).await {
        Ok(access) => access,
        Err(err) => return errors::error_response(err),
    };

    let user_id: UserId = match id.parse() {
        Ok(id) => id,
        Err(err) => return errors::error_response(err),
    };

    match services.remove_user(user_id, &access).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "success",
                "message": "User deleted successfully!",
            })),
        )
            .into_response(),
        Err(err) => errors::error_response(err),
    }
}
