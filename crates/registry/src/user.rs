//! User and profile records.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use warden_auth::RoleName;
use warden_core::{AppError, AppResult, ProfileId, UserId};

use crate::role::Role;

/// Profile owned 1:1 by a user, created and deleted with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: ProfileId,
    pub first_name: String,
    pub last_name: String,
    pub status: String,
}

/// User identity record.
///
/// `kind` is a maintained projection of role membership: every mutation that
/// changes the role set recomputes it as the dominant role name, in the same
/// transaction. The password hash never leaves the service layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub kind: RoleName,
    pub created_at: DateTime<Utc>,
    pub profile: Profile,
}

/// Input for the transactional registration path.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
    pub kind: RoleName,
}

/// A user resolved together with roles and the union of their permissions.
///
/// This is what the authorization gate loads per request; claims are never
/// trusted for permission state.
#[derive(Debug, Clone)]
pub struct UserAccess {
    pub user: User,
    pub roles: Vec<Role>,
    pub permissions: HashSet<String>,
}

/// Offset/limit pagination request, 1-based page numbering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub const DEFAULT_PAGE_SIZE: u32 = 10;
    pub const MAX_PAGE_SIZE: u32 = 100;

    pub fn new(page: Option<u32>, page_size: Option<u32>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(Self::DEFAULT_PAGE_SIZE)
                .clamp(1, Self::MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page_size) * u64::from(self.page - 1)
    }
}

/// One page of users plus the unpaged total.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub users: Vec<User>,
}

/// Split a display name into profile first/last fields.
///
/// First whitespace-separated token becomes the first name; the rest joins
/// into the last name (empty for single-token names).
pub fn split_display_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// Validate registration input before any storage work.
pub fn validate_registration(name: &str, email: &str, password: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::validation("Name cannot be empty"));
    }
    if email.trim().is_empty() || !email.contains('@') {
        return Err(AppError::validation("Invalid email format"));
    }
    if password.len() < 8 {
        return Err(AppError::validation(
            "Password must be at least 8 characters long",
        ));
    }
    Ok(())
}
