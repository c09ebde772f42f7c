//! Role records and role-level invariant helpers.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use warden_auth::RoleName;
use warden_core::{PermissionId, RoleId, UserId};

use crate::permission::Permission;

/// Role registry record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: RoleId,
    pub name: RoleName,
    pub created_at: DateTime<Utc>,
}

/// A role resolved with its attached permissions and user count.
#[derive(Debug, Clone)]
pub struct RoleDetail {
    pub role: Role,
    pub permissions: Vec<Permission>,
    pub user_count: u64,
}

/// Input for role creation.
#[derive(Debug, Clone)]
pub struct NewRole {
    pub name: RoleName,
    pub permission_ids: Vec<PermissionId>,
    pub user_ids: Vec<UserId>,
}

/// Compare two permission-id collections as unordered sets.
///
/// Used by the duplicate-role guard to distinguish "identical permissions"
/// from "same name, different permissions"; both are rejected, with different
/// messages.
pub fn permission_sets_match(existing: &[PermissionId], requested: &[PermissionId]) -> bool {
    let existing: HashSet<_> = existing.iter().copied().collect();
    let requested: HashSet<_> = requested.iter().copied().collect();
    existing == requested
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_and_duplicates_do_not_matter() {
        let a = PermissionId::new();
        let b = PermissionId::new();

        assert!(permission_sets_match(&[a, b], &[b, a]));
        assert!(permission_sets_match(&[a, b], &[b, a, a]));
        assert!(permission_sets_match(&[], &[]));
    }

    #[test]
    fn different_sets_do_not_match() {
        let a = PermissionId::new();
        let b = PermissionId::new();
        let c = PermissionId::new();

        assert!(!permission_sets_match(&[a, b], &[a, c]));
        assert!(!permission_sets_match(&[a, b], &[a]));
        assert!(!permission_sets_match(&[], &[a]));
    }
}
