use std::borrow::Cow;
use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::roles::RoleName;

/// Permission identifier.
///
/// Permissions are opaque named capabilities (e.g. `READ_users`). Checks are
/// exact string membership; no wildcard, prefix, or hierarchy matching.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionName(Cow<'static, str>);

impl PermissionName {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for PermissionName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Actions gated by the permission registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Read,
    Create,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Action; 4] = [Action::Read, Action::Create, Action::Edit, Action::Delete];
}

/// The permission that gates `action` on subjects of kind `subject`.
///
/// This is the policy table: every (action, kind) pair maps to a literal
/// permission name. Checks go through this table so that a renamed or
/// mistyped permission fails a test instead of silently changing behavior.
pub fn required_permission(action: Action, subject: RoleName) -> PermissionName {
    match (action, subject) {
        (Action::Read, RoleName::User) => PermissionName::new("READ_users"),
        (Action::Read, RoleName::Admin) => PermissionName::new("READ_admins"),
        (Action::Read, RoleName::Owner) => PermissionName::new("READ_owners"),
        (Action::Create, RoleName::User) => PermissionName::new("CREATE_users"),
        (Action::Create, RoleName::Admin) => PermissionName::new("CREATE_admins"),
        (Action::Create, RoleName::Owner) => PermissionName::new("CREATE_owners"),
        (Action::Edit, RoleName::User) => PermissionName::new("EDIT_users"),
        (Action::Edit, RoleName::Admin) => PermissionName::new("EDIT_admins"),
        (Action::Edit, RoleName::Owner) => PermissionName::new("EDIT_owners"),
        (Action::Delete, RoleName::User) => PermissionName::new("DELETE_users"),
        (Action::Delete, RoleName::Admin) => PermissionName::new("DELETE_admins"),
        (Action::Delete, RoleName::Owner) => PermissionName::new("DELETE_owners"),
    }
}

/// User kinds the holder of `granted` may see in listings.
///
/// Row-level filtering for the user directory: each `READ_*` permission
/// unlocks exactly one kind. Explicit membership tests, not suffix parsing.
pub fn visible_kinds(granted: &HashSet<String>) -> Vec<RoleName> {
    let mut kinds = Vec::new();
    if granted.contains(required_permission(Action::Read, RoleName::Admin).as_str()) {
        kinds.push(RoleName::Admin);
    }
    if granted.contains(required_permission(Action::Read, RoleName::User).as_str()) {
        kinds.push(RoleName::User);
    }
    if granted.contains(required_permission(Action::Read, RoleName::Owner).as_str()) {
        kinds.push(RoleName::Owner);
    }
    kinds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn policy_table_is_total_and_distinct() {
        let mut seen = HashSet::new();
        for action in Action::ALL {
            for subject in RoleName::ALL {
                let name = required_permission(action, subject);
                assert!(
                    seen.insert(name.as_str().to_string()),
                    "duplicate permission name {name}"
                );
            }
        }
        assert_eq!(seen.len(), 12);
    }

    #[test]
    fn policy_table_matches_documented_names() {
        assert_eq!(
            required_permission(Action::Edit, RoleName::User).as_str(),
            "EDIT_users"
        );
        assert_eq!(
            required_permission(Action::Delete, RoleName::Admin).as_str(),
            "DELETE_admins"
        );
        assert_eq!(
            required_permission(Action::Read, RoleName::Owner).as_str(),
            "READ_owners"
        );
    }

    #[test]
    fn visible_kinds_unlock_one_kind_each() {
        let granted: HashSet<String> = ["READ_users".to_string()].into_iter().collect();
        assert_eq!(visible_kinds(&granted), vec![RoleName::User]);

        let granted: HashSet<String> = ["READ_admins", "READ_owners"]
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            visible_kinds(&granted),
            vec![RoleName::Admin, RoleName::Owner]
        );

        // Similar-but-different names unlock nothing.
        let granted: HashSet<String> = ["READ_user".to_string()].into_iter().collect();
        assert!(visible_kinds(&granted).is_empty());
    }
}
