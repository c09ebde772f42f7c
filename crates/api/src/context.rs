use warden_auth::Claims;
use warden_core::UserId;

/// Verified identity claims for a request.
///
/// Carries identity only. Permission checks never read this: the gate
/// re-loads role state from the directory on every request.
#[derive(Debug, Clone)]
pub struct CallerContext {
    claims: Claims,
}

impl CallerContext {
    pub fn new(claims: Claims) -> Self {
        Self { claims }
    }

    pub fn user_id(&self) -> UserId {
        self.claims.sub
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}
