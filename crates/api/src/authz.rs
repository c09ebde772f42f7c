//! Request-time authorization gate.
//!
//! Claims carry identity only; permission state is re-loaded from the
//! directory on every check so that a revoked permission takes effect on the
//! next request, not at token expiry.

use warden_auth::{PermissionName, authorize};
use warden_core::{AppError, AppResult};
use warden_infra::Directory;
use warden_registry::UserAccess;

use crate::app::services::AppServices;
use crate::context::CallerContext;

/// Resolve the caller's current record with roles and permissions.
///
/// Fails closed with 401 when the account behind the token no longer exists.
pub async fn caller_access(
    services: &AppServices,
    caller: &CallerContext,
) -> AppResult<UserAccess> {
    services
        .directory()
        .load_user_access(caller.user_id())
        .await?
        .ok_or_else(|| AppError::authentication("You are not authenticated!"))
}

/// Route-level permission check: re-load the caller and require an exact
/// member of their resolved permission set.
pub async fn require_permission(
    services: &AppServices,
    caller: &CallerContext,
    required: &PermissionName,
) -> AppResult<UserAccess> {
    let access = caller_access(services, caller).await?;
    authorize(&access.permissions, required)?;
    Ok(access)
}
