//! `warden-core` — shared kernel for the RBAC service.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns).

pub mod error;
pub mod id;

pub use error::{AppError, AppResult};
pub use id::{PermissionId, ProfileId, RoleId, UserId};
