use std::collections::HashSet;

use warden_core::AppError;

use crate::permissions::PermissionName;

/// Authorize a caller's resolved permission set against a required permission.
///
/// - No IO
/// - No panics
/// - Exact string membership only (no wildcard or prefix matching)
pub fn authorize(granted: &HashSet<String>, required: &PermissionName) -> Result<(), AppError> {
    if granted.contains(required.as_str()) {
        Ok(())
    } else {
        Err(AppError::authorization(format!(
            "You don't have the '{}' permission",
            required.as_str()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn granted(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn allows_exact_member() {
        let perms = granted(&["READ_users", "EDIT_users"]);
        assert!(authorize(&perms, &PermissionName::new("READ_users")).is_ok());
    }

    #[test]
    fn denies_missing_permission() {
        let perms = granted(&["READ_users"]);
        let err = authorize(&perms, &PermissionName::new("DELETE_users")).unwrap_err();
        assert!(matches!(err, AppError::Authorization(_)));
    }

    #[test]
    fn no_fuzzy_matching() {
        // A similarly-named permission must not satisfy the check.
        let perms = granted(&["READ_user"]);
        assert!(authorize(&perms, &PermissionName::new("READ_users")).is_err());

        let perms = granted(&["READ_users"]);
        assert!(authorize(&perms, &PermissionName::new("READ_user")).is_err());
    }

    #[test]
    fn empty_set_denies_everything() {
        let perms = granted(&[]);
        assert!(authorize(&perms, &PermissionName::new("READ_users")).is_err());
    }

    proptest! {
        /// Allowed iff the exact name is a member of the granted set.
        #[test]
        fn allow_iff_exact_member(
            names in prop::collection::hash_set("[A-Z]{2,8}_[a-z]{2,8}", 0..8),
            candidate in "[A-Z]{2,8}_[a-z]{2,8}",
        ) {
            let perms: HashSet<String> = names.iter().cloned().collect();
            let outcome = authorize(&perms, &PermissionName::new(candidate.clone()));
            prop_assert_eq!(outcome.is_ok(), perms.contains(&candidate));
        }
    }
}
