//! Idempotent default data: the standard permission set, the three fixed
//! roles, and a bootstrap admin account.

use warden_auth::{Action, RoleName, password, required_permission};
use warden_core::{AppResult, PermissionId};
use warden_registry::{NewRole, NewUser, split_display_name};

use crate::directory::Directory;

pub const DEFAULT_ADMIN_EMAIL: &str = "admin@example.com";
pub const DEFAULT_ADMIN_NAME: &str = "Default Admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123!";

/// Ensure the standard permissions, the fixed roles, and a bootstrap admin
/// exist. Safe to run repeatedly; existing rows are left alone.
pub async fn seed_defaults(directory: &dyn Directory) -> AppResult<()> {
    let mut all_permission_ids = Vec::new();
    let mut user_permission_ids = Vec::new();

    for action in Action::ALL {
        for subject in RoleName::ALL {
            let name = required_permission(action, subject);
            let permission = match directory.find_permission_by_name(name.as_str()).await? {
                Some(existing) => existing,
                None => directory.create_permission(name.as_str()).await?,
            };
            if matches!((action, subject), (Action::Read, RoleName::User)) {
                user_permission_ids.push(permission.id);
            }
            all_permission_ids.push(permission.id);
        }
    }

    // admin and owner hold everything; user can only read their own kind.
    ensure_role(directory, RoleName::Admin, &all_permission_ids).await?;
    ensure_role(directory, RoleName::Owner, &all_permission_ids).await?;
    ensure_role(directory, RoleName::User, &user_permission_ids).await?;

    if directory
        .find_user_by_email(DEFAULT_ADMIN_EMAIL)
        .await?
        .is_none()
    {
        let (first_name, last_name) = split_display_name(DEFAULT_ADMIN_NAME);
        directory
            .create_user(NewUser {
                name: DEFAULT_ADMIN_NAME.to_string(),
                email: DEFAULT_ADMIN_EMAIL.to_string(),
                first_name,
                last_name,
                password_hash: password::hash_password(DEFAULT_ADMIN_PASSWORD)?,
                kind: RoleName::Admin,
            })
            .await?;
        tracing::info!(email = DEFAULT_ADMIN_EMAIL, "seeded bootstrap admin user");
    }

    Ok(())
}

async fn ensure_role(
    directory: &dyn Directory,
    name: RoleName,
    permission_ids: &[PermissionId],
) -> AppResult<()> {
    if directory.find_role_by_name(name).await?.is_none() {
        directory
            .create_role(NewRole {
                name,
                permission_ids: permission_ids.to_vec(),
                user_ids: vec![],
            })
            .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::InMemoryDirectory;

    #[tokio::test]
    async fn seeding_is_idempotent() {
        let dir = InMemoryDirectory::new();
        seed_defaults(&dir).await.unwrap();
        seed_defaults(&dir).await.unwrap();

        assert_eq!(dir.list_permissions().await.unwrap().len(), 12);
        assert_eq!(dir.list_roles().await.unwrap().len(), 3);

        let admin = dir
            .find_user_by_email(DEFAULT_ADMIN_EMAIL)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(admin.kind, RoleName::Admin);

        let access = dir.load_user_access(admin.id).await.unwrap().unwrap();
        assert!(access.permissions.contains("READ_admins"));
        assert!(access.permissions.contains("DELETE_owners"));
        assert_eq!(access.permissions.len(), 12);
    }

    #[tokio::test]
    async fn user_role_is_read_only() {
        let dir = InMemoryDirectory::new();
        seed_defaults(&dir).await.unwrap();

        let user_role = dir
            .find_role_by_name(RoleName::User)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user_role.permissions.len(), 1);
        assert_eq!(user_role.permissions[0].name, "READ_users");
    }
}
