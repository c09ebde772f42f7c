//! Dashboard read models.

use chrono::{DateTime, Utc};

use warden_auth::RoleName;
use warden_core::UserId;

/// Aggregate counts plus recent signups for the admin dashboard.
#[derive(Debug, Clone)]
pub struct DashboardStats {
    pub users_total: u64,
    pub users_new_this_week: u64,
    pub roles_total: u64,
    pub role_names: Vec<RoleName>,
    pub permissions_total: u64,
    pub recent_signups: Vec<RecentSignup>,
}

/// A recently registered user, newest first.
#[derive(Debug, Clone)]
pub struct RecentSignup {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}
