//! The `Directory` storage port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warden_auth::RoleName;
use warden_core::{AppResult, PermissionId, RoleId, UserId};
use warden_registry::{
    AffectedRole, DashboardStats, NewRole, NewUser, PageRequest, Permission, PermissionDetail,
    Role, RoleDetail, User, UserAccess, UserPage,
};

mod in_memory;
mod postgres;

pub use in_memory::InMemoryDirectory;
pub use postgres::PostgresDirectory;

/// Relational store for users, roles, permissions and their associations.
///
/// Multi-row operations (`create_user`, `delete_role`, `delete_permission`)
/// are atomic in every implementation: partial effects are never observable.
/// Uniqueness (user email, role name, permission name) is enforced here as a
/// backstop; callers pre-check to produce descriptive conflict messages.
#[async_trait]
pub trait Directory: Send + Sync {
    // ── Users ──

    async fn find_user(&self, id: UserId) -> AppResult<Option<User>>;

    /// Exact-match lookup; the login path depends on this being case-sensitive.
    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    /// Load a user together with roles and the union of role permissions.
    async fn load_user_access(&self, id: UserId) -> AppResult<Option<UserAccess>>;

    /// Transactional registration: profile + user + default-role link commit
    /// together or not at all. The stored `kind` is the dominant attached
    /// role, falling back to the requested kind when no role matched.
    async fn create_user(&self, new_user: NewUser) -> AppResult<User>;

    /// Partial contact update. An email change that collides with another
    /// user fails with a conflict.
    async fn update_user_contact(
        &self,
        id: UserId,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<User>;

    /// Link a role to a user and recompute the user's `kind` projection.
    async fn assign_role_to_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()>;

    /// Hard-delete a user with their profile and role links.
    async fn delete_user(&self, id: UserId) -> AppResult<()>;

    /// Users whose kind is in `kinds`, oldest-created-first, offset/limit
    /// paged. The total counts all matching rows, not just the page.
    async fn list_users(&self, kinds: &[RoleName], page: &PageRequest) -> AppResult<UserPage>;

    // ── Roles ──

    async fn find_role(&self, id: RoleId) -> AppResult<Option<Role>>;

    async fn find_role_by_name(&self, name: RoleName) -> AppResult<Option<RoleDetail>>;

    async fn load_role_detail(&self, id: RoleId) -> AppResult<Option<RoleDetail>>;

    /// Create a role and attach the given permissions and users (recomputing
    /// each attached user's `kind`). Unknown ids fail the whole operation.
    async fn create_role(&self, new_role: NewRole) -> AppResult<RoleDetail>;

    /// Detach all permissions and remove the role, atomically. Fails with
    /// `InUse` while any user holds the role; the referential guard lives in
    /// application logic, not only in the schema.
    async fn delete_role(&self, id: RoleId) -> AppResult<()>;

    /// All roles with their permissions, newest-created-first.
    async fn list_roles(&self) -> AppResult<Vec<RoleDetail>>;

    // ── Permissions ──

    async fn find_permission(&self, id: PermissionId) -> AppResult<Option<PermissionDetail>>;

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>>;

    async fn create_permission(&self, name: &str) -> AppResult<Permission>;

    /// Detach the permission from every role that holds it, remove the row,
    /// and report the affected roles. Never blocked by usage.
    async fn delete_permission(&self, id: PermissionId) -> AppResult<Vec<AffectedRole>>;

    /// All permissions, newest-created-first.
    async fn list_permissions(&self) -> AppResult<Vec<Permission>>;

    // ── Dashboard ──

    async fn dashboard_stats(
        &self,
        since: DateTime<Utc>,
        recent_limit: u32,
    ) -> AppResult<DashboardStats>;
}
