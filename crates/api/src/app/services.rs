//! Service wiring and the registry mutation guards.
//!
//! `AppServices` owns the directory and token service; its methods are the
//! invariant-preserving operations the route handlers call. Storage choice is
//! environment-driven: Postgres when `USE_PERSISTENT_STORES=true`, otherwise
//! the seeded in-memory directory for dev/tests.

use std::sync::Arc;

use chrono::{Duration, Utc};

use warden_auth::{
    Action, RoleName, TokenService, authorize, password, required_permission, visible_kinds,
};
use warden_core::{AppError, AppResult, PermissionId, RoleId, UserId};
use warden_infra::{Directory, InMemoryDirectory, PostgresDirectory, seed_defaults};
use warden_registry::{
    AffectedRole, DashboardStats, NewRole, NewUser, PageRequest, Permission, PermissionDetail,
    Role, RoleDetail, User, UserAccess, UserPage, permission_sets_match, split_display_name,
    validate_permission_name, validate_registration,
};

/// Shared message for unknown-email and wrong-password logins: identical on
/// purpose, so responses cannot be used to enumerate accounts.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password!";

const RECENT_SIGNUPS: u32 = 5;

/// Outcome of a role assignment: linking an already-held role is an
/// informational no-op, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    Assigned,
    AlreadyHeld,
}

#[derive(Clone)]
pub struct AppServices {
    directory: Arc<dyn Directory>,
    tokens: Arc<TokenService>,
}

/// Build services from the environment (same switch as the reference daemon).
pub async fn build_services(jwt_secret: &str) -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    let directory: Arc<dyn Directory> = if use_persistent {
        let database_url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");
        let directory = PostgresDirectory::connect(&database_url)
            .await
            .expect("failed to connect to Postgres");

        let seed = std::env::var("SEED_DEFAULTS")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);
        if seed {
            seed_defaults(&directory)
                .await
                .expect("failed to seed defaults");
        }

        Arc::new(directory)
    } else {
        let directory = InMemoryDirectory::new();
        seed_defaults(&directory)
            .await
            .expect("failed to seed in-memory defaults");
        Arc::new(directory)
    };

    AppServices::new(directory, Arc::new(TokenService::new(jwt_secret.as_bytes())))
}

impl AppServices {
    pub fn new(directory: Arc<dyn Directory>, tokens: Arc<TokenService>) -> Self {
        Self { directory, tokens }
    }

    pub fn directory(&self) -> &Arc<dyn Directory> {
        &self.directory
    }

    pub fn tokens(&self) -> Arc<TokenService> {
        self.tokens.clone()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Authentication
    // ─────────────────────────────────────────────────────────────────────

    /// Exact-match email lookup, constant-time-safe hash comparison, then
    /// token issuance. Store failures stay 500-class; they are never folded
    /// into the credentials error.
    pub async fn login(&self, email: &str, plain_password: &str) -> AppResult<(String, User)> {
        let Some(user) = self.directory.find_user_by_email(email).await? else {
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        };

        if !password::verify_password(plain_password, &user.password_hash) {
            return Err(AppError::authentication(INVALID_CREDENTIALS));
        }

        let token = self
            .tokens
            .issue(user.id, &user.email, &user.name, user.kind)?;

        tracing::info!(user = %user.id, "login succeeded");
        Ok((token, user))
    }

    /// Transactional registration: profile split, password hash, user row and
    /// default-role link commit together or not at all.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        plain_password: &str,
        kind: Option<RoleName>,
    ) -> AppResult<User> {
        validate_registration(name, email, plain_password)?;

        if self.directory.find_user_by_email(email).await?.is_some() {
            return Err(AppError::conflict(format!(
                "User with email '{email}' already exists"
            )));
        }

        let (first_name, last_name) = split_display_name(name);
        let password_hash = password::hash_password(plain_password)?;

        let user = self
            .directory
            .create_user(NewUser {
                name: name.to_string(),
                email: email.to_string(),
                first_name,
                last_name,
                password_hash,
                kind: kind.unwrap_or(RoleName::User),
            })
            .await?;

        tracing::info!(user = %user.id, "user registered");
        Ok(user)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Users
    // ─────────────────────────────────────────────────────────────────────

    /// Row-filtered user listing: the actor's permission set determines which
    /// kinds are visible; no permission means an empty page, not an error.
    pub async fn users_page(
        &self,
        page: &PageRequest,
        actor: &UserAccess,
    ) -> AppResult<UserPage> {
        let kinds = visible_kinds(&actor.permissions);
        if kinds.is_empty() {
            return Ok(UserPage {
                page: page.page,
                page_size: page.page_size,
                total: 0,
                users: vec![],
            });
        }
        self.directory.list_users(&kinds, page).await
    }

    pub async fn user_detail(&self, id: UserId) -> AppResult<UserAccess> {
        self.directory
            .load_user_access(id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Data-scoped role assignment: the actor needs the edit permission for
    /// the *target's* kind, on top of whatever route-level gate admitted them.
    pub async fn assign_role(
        &self,
        target_id: UserId,
        role_id: RoleId,
        actor: &UserAccess,
    ) -> AppResult<AssignOutcome> {
        let target = self.user_detail(target_id).await?;
        let Some(role) = self.directory.find_role(role_id).await? else {
            return Err(AppError::not_found("Role not found"));
        };

        let needed = required_permission(Action::Edit, target.user.kind);
        if authorize(&actor.permissions, &needed).is_err() {
            return Err(AppError::authorization(format!(
                "You don't have a permission to edit {}",
                target.user.kind
            )));
        }

        if target.roles.iter().any(|held| held.id == role.id) {
            return Ok(AssignOutcome::AlreadyHeld);
        }

        self.directory.assign_role_to_user(target_id, role_id).await?;
        tracing::info!(user = %target_id, role = %role.name, "role assigned");
        Ok(AssignOutcome::Assigned)
    }

    /// Data-scoped hard delete: requires the delete permission for the
    /// target's kind.
    pub async fn remove_user(&self, target_id: UserId, actor: &UserAccess) -> AppResult<()> {
        let target = self.user_detail(target_id).await?;

        let needed = required_permission(Action::Delete, target.user.kind);
        if authorize(&actor.permissions, &needed).is_err() {
            return Err(AppError::authorization(format!(
                "You don't have a permission to delete {}",
                target.user.kind
            )));
        }

        self.directory.delete_user(target_id).await?;
        tracing::info!(user = %target_id, "user deleted");
        Ok(())
    }

    /// Partial own-profile update. An email change re-checks uniqueness; two
    /// users must never collide on the login key.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<User> {
        if let Some(name) = &name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Name cannot be empty"));
            }
        }
        if let Some(email) = &email {
            if email.trim().is_empty() || !email.contains('@') {
                return Err(AppError::validation("Invalid email format"));
            }
        }

        self.directory.update_user_contact(user_id, name, email).await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Roles
    // ─────────────────────────────────────────────────────────────────────

    pub async fn roles_overview(&self) -> AppResult<Vec<RoleDetail>> {
        self.directory.list_roles().await
    }

    /// Name is the uniqueness key. An existing role rejects the create either
    /// way; the message distinguishes an identical permission set from a
    /// differing one.
    pub async fn create_role(
        &self,
        name: RoleName,
        permission_ids: Vec<PermissionId>,
        user_ids: Vec<UserId>,
    ) -> AppResult<RoleDetail> {
        if let Some(existing) = self.directory.find_role_by_name(name).await? {
            let existing_ids: Vec<PermissionId> =
                existing.permissions.iter().map(|p| p.id).collect();
            if permission_sets_match(&existing_ids, &permission_ids) {
                return Err(AppError::conflict(format!(
                    "Role with name '{name}' and identical permissions already exists"
                )));
            }
            return Err(AppError::conflict(format!(
                "Role with name '{name}' already exists"
            )));
        }

        let detail = self
            .directory
            .create_role(NewRole {
                name,
                permission_ids,
                user_ids,
            })
            .await?;
        tracing::info!(role = %detail.role.name, "role created");
        Ok(detail)
    }

    /// A role held by any user is never deleted; silent privilege loss for
    /// live accounts is worse than making the caller detach members first.
    pub async fn remove_role(&self, id: RoleId) -> AppResult<Role> {
        let Some(detail) = self.directory.load_role_detail(id).await? else {
            return Err(AppError::not_found(format!("Role with ID '{id}' not found")));
        };

        if detail.user_count > 0 {
            let count = detail.user_count;
            let plural = if count > 1 { "s" } else { "" };
            return Err(AppError::in_use(format!(
                "Cannot delete role '{}' because it is assigned to {count} user{plural}",
                detail.role.name
            )));
        }

        self.directory.delete_role(id).await?;
        tracing::info!(role = %detail.role.name, "role deleted");
        Ok(detail.role)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Permissions
    // ─────────────────────────────────────────────────────────────────────

    pub async fn permissions_overview(&self) -> AppResult<Vec<Permission>> {
        self.directory.list_permissions().await
    }

    pub async fn create_permission(&self, name: &str) -> AppResult<Permission> {
        let name = name.trim();
        validate_permission_name(name)?;

        if self.directory.find_permission_by_name(name).await?.is_some() {
            return Err(AppError::conflict(format!(
                "Permission with name '{name}' already exists"
            )));
        }

        let permission = self.directory.create_permission(name).await?;
        tracing::info!(permission = %permission.name, "permission created");
        Ok(permission)
    }

    pub async fn permission_detail(&self, id: PermissionId) -> AppResult<PermissionDetail> {
        self.directory
            .find_permission(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Permission with ID '{id}' not found")))
    }

    /// Unlike roles, permissions delete even while referenced: every holding
    /// role is detached first and reported back so the caller can warn.
    pub async fn remove_permission(&self, id: PermissionId) -> AppResult<Vec<AffectedRole>> {
        let affected = self.directory.delete_permission(id).await?;
        tracing::info!(permission = %id, detached_roles = affected.len(), "permission deleted");
        Ok(affected)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Dashboard
    // ─────────────────────────────────────────────────────────────────────

    pub async fn dashboard(&self) -> AppResult<DashboardStats> {
        self.directory
            .dashboard_stats(Utc::now() - Duration::days(7), RECENT_SIGNUPS)
            .await
    }
}
