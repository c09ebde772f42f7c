//! Request DTOs and JSON mapping helpers.
//!
//! Wire field names follow the admin frontend's camelCase contract. The
//! password hash never appears in any mapping here.

use serde::Deserialize;
use serde_json::json;

use warden_auth::RoleName;
use warden_core::{PermissionId, RoleId, UserId};
use warden_registry::{
    AffectedRole, DashboardStats, Permission, PermissionDetail, Role, RoleDetail, User,
    UserAccess, UserPage,
};

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "type")]
    pub kind: Option<RoleName>,
}

#[derive(Debug, Deserialize)]
pub struct AssignRoleRequest {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    #[serde(rename = "roleId")]
    pub role_id: RoleId,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateRoleRequest {
    pub name: RoleName,
    #[serde(rename = "permissionsId")]
    pub permission_ids: Vec<PermissionId>,
    #[serde(rename = "usersId", default)]
    pub user_ids: Vec<UserId>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePermissionRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListUsersQuery {
    pub page: Option<u32>,
    #[serde(rename = "pageSize")]
    pub page_size: Option<u32>,
}

// -------------------------
// JSON mapping helpers
// -------------------------

pub fn user_to_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id.to_string(),
        "email": user.email,
        "name": user.name,
        "type": user.kind.as_str(),
        "createdAt": user.created_at.to_rfc3339(),
        "profile": {
            "firstName": user.profile.first_name,
            "lastName": user.profile.last_name,
            "status": user.profile.status,
        },
    })
}

/// Compact shape for registration responses.
pub fn user_summary_to_json(user: &User) -> serde_json::Value {
    json!({
        "id": user.id.to_string(),
        "email": user.email,
        "name": user.name,
    })
}

/// A user with their roles and the union of role permissions.
pub fn user_access_to_json(access: &UserAccess) -> serde_json::Value {
    let mut permissions: Vec<&str> = access.permissions.iter().map(String::as_str).collect();
    permissions.sort_unstable();

    let mut value = user_to_json(&access.user);
    value["roles"] = access.roles.iter().map(role_to_json).collect();
    value["permissions"] = json!(permissions);
    value
}

pub fn user_page_to_json(page: &UserPage) -> serde_json::Value {
    json!({
        "page": page.page,
        "pageSize": page.page_size,
        "total": page.total,
        "users": page.users.iter().map(user_to_json).collect::<Vec<_>>(),
    })
}

pub fn role_to_json(role: &Role) -> serde_json::Value {
    json!({
        "id": role.id.to_string(),
        "name": role.name.as_str(),
        "createdAt": role.created_at.to_rfc3339(),
    })
}

pub fn role_detail_to_json(detail: &RoleDetail) -> serde_json::Value {
    let mut value = role_to_json(&detail.role);
    value["permissions"] = detail.permissions.iter().map(permission_to_json).collect();
    value["userCount"] = json!(detail.user_count);
    value
}

pub fn permission_to_json(permission: &Permission) -> serde_json::Value {
    json!({
        "id": permission.id.to_string(),
        "name": permission.name,
        "createdAt": permission.created_at.to_rfc3339(),
    })
}

pub fn permission_detail_to_json(detail: &PermissionDetail) -> serde_json::Value {
    let mut value = permission_to_json(&detail.permission);
    value["roles"] = detail.roles.iter().map(role_to_json).collect();
    value
}

pub fn affected_roles_to_json(affected: &[AffectedRole]) -> serde_json::Value {
    affected
        .iter()
        .map(|role| {
            json!({
                "id": role.id.to_string(),
                "name": role.name.as_str(),
            })
        })
        .collect()
}

pub fn stats_to_json(stats: &DashboardStats) -> serde_json::Value {
    json!({
        "stats": {
            "users": {
                "total": stats.users_total,
                "newThisWeek": stats.users_new_this_week,
            },
            "roles": {
                "total": stats.roles_total,
                "types": stats.role_names.iter().map(|n| n.as_str()).collect::<Vec<_>>(),
            },
            "permissions": {
                "total": stats.permissions_total,
            },
        },
        "recentActivities": stats.recent_signups.iter().map(|signup| json!({
            "type": "user_registered",
            "entity": "user",
            "data": {
                "name": signup.name,
                "email": signup.email,
            },
            "timestamp": signup.created_at.to_rfc3339(),
        })).collect::<Vec<_>>(),
    })
}
