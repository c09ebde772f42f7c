//! In-memory directory for tests and dev mode.
//!
//! A single `RwLock` over the whole state makes every trait call atomic,
//! which is exactly the transactional behavior the Postgres adapter provides
//! per operation.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use warden_auth::RoleName;
use warden_core::{AppError, AppResult, PermissionId, ProfileId, RoleId, UserId};
use warden_registry::{
    AffectedRole, DashboardStats, NewRole, NewUser, PageRequest, Permission, PermissionDetail,
    Profile, RecentSignup, Role, RoleDetail, User, UserAccess, UserPage,
};

use super::Directory;

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    roles: HashMap<RoleId, Role>,
    permissions: HashMap<PermissionId, Permission>,
    role_permissions: HashSet<(RoleId, PermissionId)>,
    role_users: HashSet<(RoleId, UserId)>,
}

impl State {
    fn roles_of(&self, user_id: UserId) -> Vec<Role> {
        let mut roles: Vec<Role> = self
            .role_users
            .iter()
            .filter(|(_, u)| *u == user_id)
            .filter_map(|(r, _)| self.roles.get(r).cloned())
            .collect();
        roles.sort_by_key(|r| (r.created_at, *r.id.as_uuid()));
        roles
    }

    fn permissions_of_role(&self, role_id: RoleId) -> Vec<Permission> {
        let mut permissions: Vec<Permission> = self
            .role_permissions
            .iter()
            .filter(|(r, _)| *r == role_id)
            .filter_map(|(_, p)| self.permissions.get(p).cloned())
            .collect();
        permissions.sort_by_key(|p| (p.created_at, *p.id.as_uuid()));
        permissions
    }

    fn role_user_count(&self, role_id: RoleId) -> u64 {
        self.role_users.iter().filter(|(r, _)| *r == role_id).count() as u64
    }

    fn role_detail(&self, role: &Role) -> RoleDetail {
        RoleDetail {
            role: role.clone(),
            permissions: self.permissions_of_role(role.id),
            user_count: self.role_user_count(role.id),
        }
    }

    fn recompute_kind(&mut self, user_id: UserId) {
        let dominant = RoleName::dominant(self.roles_of(user_id).iter().map(|r| r.name));
        if let Some(user) = self.users.get_mut(&user_id) {
            user.kind = dominant.unwrap_or(RoleName::User);
        }
    }
}

/// RwLock-backed directory; state dies with the process.
#[derive(Default)]
pub struct InMemoryDirectory {
    state: RwLock<State>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AppResult<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| AppError::internal("directory lock poisoned"))
    }

    fn write(&self) -> AppResult<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| AppError::internal("directory lock poisoned"))
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn find_user(&self, id: UserId) -> AppResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn load_user_access(&self, id: UserId) -> AppResult<Option<UserAccess>> {
        let state = self.read()?;
        let Some(user) = state.users.get(&id).cloned() else {
            return Ok(None);
        };

        let roles = state.roles_of(id);
        let permissions: HashSet<String> = roles
            .iter()
            .flat_map(|r| state.permissions_of_role(r.id))
            .map(|p| p.name)
            .collect();

        Ok(Some(UserAccess {
            user,
            roles,
            permissions,
        }))
    }

    async fn create_user(&self, new_user: NewUser) -> AppResult<User> {
        let mut state = self.write()?;

        if state.users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict(format!(
                "User with email '{}' already exists",
                new_user.email
            )));
        }

        let default_role = state
            .roles
            .values()
            .find(|r| r.name == new_user.kind)
            .cloned();

        let id = UserId::new();
        let user = User {
            id,
            email: new_user.email,
            name: new_user.name,
            password_hash: new_user.password_hash,
            kind: default_role
                .as_ref()
                .map(|r| r.name)
                .unwrap_or(new_user.kind),
            created_at: Utc::now(),
            profile: Profile {
                id: ProfileId::new(),
                first_name: new_user.first_name,
                last_name: new_user.last_name,
                status: String::new(),
            },
        };

        state.users.insert(id, user.clone());
        if let Some(role) = default_role {
            state.role_users.insert((role.id, id));
        }

        Ok(user)
    }

    async fn update_user_contact(
        &self,
        id: UserId,
        name: Option<String>,
        email: Option<String>,
    ) -> AppResult<User> {
        let mut state = self.write()?;

        if let Some(new_email) = &email {
            let taken = state
                .users
                .values()
                .any(|u| u.id != id && &u.email == new_email);
            if taken {
                return Err(AppError::conflict("Email address is already in use"));
            }
        }

        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if let Some(name) = name {
            user.name = name;
        }
        if let Some(email) = email {
            user.email = email;
        }

        Ok(user.clone())
    }

    async fn assign_role_to_user(&self, user_id: UserId, role_id: RoleId) -> AppResult<()> {
        let mut state = self.write()?;

        if !state.users.contains_key(&user_id) {
            return Err(AppError::not_found("User not found"));
        }
        if !state.roles.contains_key(&role_id) {
            return Err(AppError::not_found("Role not found"));
        }

        state.role_users.insert((role_id, user_id));
        state.recompute_kind(user_id);
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> AppResult<()> {
        let mut state = self.write()?;

        if state.users.remove(&id).is_none() {
            return Err(AppError::not_found("User not found"));
        }
        state.role_users.retain(|(_, u)| *u != id);
        Ok(())
    }

    async fn list_users(&self, kinds: &[RoleName], page: &PageRequest) -> AppResult<UserPage> {
        let state = self.read()?;

        let mut matching: Vec<User> = state
            .users
            .values()
            .filter(|u| kinds.contains(&u.kind))
            .cloned()
            .collect();
        matching.sort_by_key(|u| (u.created_at, *u.id.as_uuid()));

        let total = matching.len() as u64;
        let users: Vec<User> = matching
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size as usize)
            .collect();

        Ok(UserPage {
            page: page.page,
            page_size: page.page_size,
            total,
            users,
        })
    }

    async fn find_role(&self, id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.read()?.roles.get(&id).cloned())
    }

    async fn find_role_by_name(&self, name: RoleName) -> AppResult<Option<RoleDetail>> {
        let state = self.read()?;
        Ok(state
            .roles
            .values()
            .find(|r| r.name == name)
            .map(|r| state.role_detail(r)))
    }

    async fn load_role_detail(&self, id: RoleId) -> AppResult<Option<RoleDetail>> {
        let state = self.read()?;
        Ok(state.roles.get(&id).map(|r| state.role_detail(r)))
    }

    async fn create_role(&self, new_role: NewRole) -> AppResult<RoleDetail> {
        let mut state = self.write()?;

        if state.roles.values().any(|r| r.name == new_role.name) {
            return Err(AppError::conflict(format!(
                "Role with name '{}' already exists",
                new_role.name
            )));
        }

        // Resolve every id before mutating anything: unknown ids fail the
        // whole operation.
        for permission_id in &new_role.permission_ids {
            if !state.permissions.contains_key(permission_id) {
                return Err(AppError::not_found("Permission not found"));
            }
        }
        for user_id in &new_role.user_ids {
            if !state.users.contains_key(user_id) {
                return Err(AppError::not_found("User not found"));
            }
        }

        let role = Role {
            id: RoleId::new(),
            name: new_role.name,
            created_at: Utc::now(),
        };
        state.roles.insert(role.id, role.clone());

        for permission_id in &new_role.permission_ids {
            state.role_permissions.insert((role.id, *permission_id));
        }
        for user_id in &new_role.user_ids {
            state.role_users.insert((role.id, *user_id));
            state.recompute_kind(*user_id);
        }

        Ok(state.role_detail(&role))
    }

    async fn delete_role(&self, id: RoleId) -> AppResult<()> {
        let mut state = self.write()?;

        let Some(role) = state.roles.get(&id).cloned() else {
            return Err(AppError::not_found(format!("Role with ID '{id}' not found")));
        };

        let user_count = state.role_user_count(id);
        if user_count > 0 {
            let plural = if user_count > 1 { "s" } else { "" };
            return Err(AppError::in_use(format!(
                "Cannot delete role '{}' because it is assigned to {user_count} user{plural}",
                role.name
            )));
        }

        state.role_permissions.retain(|(r, _)| *r != id);
        state.roles.remove(&id);
        Ok(())
    }

    async fn list_roles(&self) -> AppResult<Vec<RoleDetail>> {
        let state = self.read()?;
        let mut roles: Vec<&Role> = state.roles.values().collect();
        roles.sort_by_key(|r| std::cmp::Reverse((r.created_at, *r.id.as_uuid())));
        Ok(roles.into_iter().map(|r| state.role_detail(r)).collect())
    }

    async fn find_permission(&self, id: PermissionId) -> AppResult<Option<PermissionDetail>> {
        let state = self.read()?;
        let Some(permission) = state.permissions.get(&id).cloned() else {
            return Ok(None);
        };

        let mut roles: Vec<Role> = state
            .role_permissions
            .iter()
            .filter(|(_, p)| *p == id)
            .filter_map(|(r, _)| state.roles.get(r).cloned())
            .collect();
        roles.sort_by_key(|r| (r.created_at, *r.id.as_uuid()));

        Ok(Some(PermissionDetail { permission, roles }))
    }

    async fn find_permission_by_name(&self, name: &str) -> AppResult<Option<Permission>> {
        Ok(self
            .read()?
            .permissions
            .values()
            .find(|p| p.name == name)
            .cloned())
    }

    async fn create_permission(&self, name: &str) -> AppResult<Permission> {
        let mut state = self.write()?;

        if state.permissions.values().any(|p| p.name == name) {
            return Err(AppError::conflict(format!(
                "Permission with name '{name}' already exists"
            )));
        }

        let permission = Permission {
            id: PermissionId::new(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        state.permissions.insert(permission.id, permission.clone());
        Ok(permission)
    }

    async fn delete_permission(&self, id: PermissionId) -> AppResult<Vec<AffectedRole>> {
        let mut state = self.write()?;

        if !state.permissions.contains_key(&id) {
            return Err(AppError::not_found(format!(
                "Permission with ID '{id}' not found"
            )));
        }

        let mut affected: Vec<AffectedRole> = state
            .role_permissions
            .iter()
            .filter(|(_, p)| *p == id)
            .filter_map(|(r, _)| state.roles.get(r))
            .map(|role| AffectedRole {
                id: role.id,
                name: role.name,
            })
            .collect();
        affected.sort_by_key(|r| *r.id.as_uuid());

        state.role_permissions.retain(|(_, p)| *p != id);
        state.permissions.remove(&id);
        Ok(affected)
    }

    async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let state = self.read()?;
        let mut permissions: Vec<Permission> = state.permissions.values().cloned().collect();
        permissions.sort_by_key(|p| std::cmp::Reverse((p.created_at, *p.id.as_uuid())));
        Ok(permissions)
    }

    async fn dashboard_stats(
        &self,
        since: DateTime<Utc>,
        recent_limit: u32,
    ) -> AppResult<DashboardStats> {
        let state = self.read()?;

        let mut recent: Vec<&User> = state.users.values().collect();
        recent.sort_by_key(|u| std::cmp::Reverse((u.created_at, *u.id.as_uuid())));

        let mut role_names: Vec<&Role> = state.roles.values().collect();
        role_names.sort_by_key(|r| std::cmp::Reverse((r.created_at, *r.id.as_uuid())));

        Ok(DashboardStats {
            users_total: state.users.len() as u64,
            users_new_this_week: state
                .users
                .values()
                .filter(|u| u.created_at >= since)
                .count() as u64,
            roles_total: state.roles.len() as u64,
            role_names: role_names.into_iter().map(|r| r.name).collect(),
            permissions_total: state.permissions.len() as u64,
            recent_signups: recent
                .into_iter()
                .take(recent_limit as usize)
                .map(|u| RecentSignup {
                    id: u.id,
                    name: u.name.clone(),
                    email: u.email.clone(),
                    created_at: u.created_at,
                })
                .collect(),
        })
    }
}
