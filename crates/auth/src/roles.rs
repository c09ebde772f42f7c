use core::str::FromStr;

use serde::{Deserialize, Serialize};

use warden_core::AppError;

/// Role name used for RBAC.
///
/// The system runs on a closed set of roles; a user's `kind` is always one of
/// these. Variant order is the dominance ranking used by [`RoleName::dominant`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RoleName {
    User,
    Admin,
    Owner,
}

impl RoleName {
    pub const ALL: [RoleName; 3] = [RoleName::User, RoleName::Admin, RoleName::Owner];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoleName::User => "user",
            RoleName::Admin => "admin",
            RoleName::Owner => "owner",
        }
    }

    /// Highest-ranked role in `roles` (owner > admin > user), if any.
    ///
    /// A user's `kind` is this projection of their role memberships; callers
    /// choose the fallback for the empty set.
    pub fn dominant<I>(roles: I) -> Option<RoleName>
    where
        I: IntoIterator<Item = RoleName>,
    {
        roles.into_iter().max()
    }
}

impl core::fmt::Display for RoleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoleName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(RoleName::User),
            "admin" => Ok(RoleName::Admin),
            "owner" => Ok(RoleName::Owner),
            other => Err(AppError::validation(format!("unknown role name '{other}'"))),
        }
    }
}
