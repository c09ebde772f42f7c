use serde::{Deserialize, Serialize};

use warden_core::UserId;

use crate::roles::RoleName;

/// JWT claims model (transport-agnostic).
///
/// Identity fields only. Permission state is never read from claims: the
/// authorization gate re-loads the caller's roles on every request so that a
/// revoked permission takes effect immediately, not at token expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject / user identifier.
    pub sub: UserId,

    pub email: String,

    pub name: String,

    /// The user's kind at issuance time (display only; not trusted for authz).
    pub kind: RoleName,

    /// Issued-at, seconds since the epoch.
    pub iat: i64,

    /// Expiry, seconds since the epoch.
    pub exp: i64,
}
