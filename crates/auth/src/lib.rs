//! `warden-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod authorize;
pub mod claims;
pub mod password;
pub mod permissions;
pub mod roles;
pub mod token;

pub use authorize::authorize;
pub use claims::Claims;
pub use permissions::{Action, PermissionName, required_permission, visible_kinds};
pub use roles::RoleName;
pub use token::TokenService;
