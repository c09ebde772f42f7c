//! Permission records.

use chrono::{DateTime, Utc};

use warden_auth::RoleName;
use warden_core::{AppError, AppResult, PermissionId, RoleId};

use crate::role::Role;

/// Permission registry record. Names are free-form but unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permission {
    pub id: PermissionId,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// A permission resolved with the roles that hold it (for display).
#[derive(Debug, Clone)]
pub struct PermissionDetail {
    pub permission: Permission,
    pub roles: Vec<Role>,
}

/// A role touched by a cascading permission deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AffectedRole {
    pub id: RoleId,
    pub name: RoleName,
}

/// Validate a permission name before insert.
pub fn validate_permission_name(name: &str) -> AppResult<()> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation("Permission name cannot be empty"));
    }
    if trimmed.len() > 128 {
        return Err(AppError::validation(
            "Permission name must be at most 128 characters",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validation() {
        assert!(validate_permission_name("READ_users").is_ok());
        assert!(validate_permission_name("").is_err());
        assert!(validate_permission_name("   ").is_err());
        assert!(validate_permission_name(&"x".repeat(200)).is_err());
    }
}
