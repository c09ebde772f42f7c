//! Session token issuance and verification (HS256).

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use warden_core::{AppError, AppResult, UserId};

use crate::claims::Claims;
use crate::roles::RoleName;

/// Session lifetime: two weeks.
pub const SESSION_TTL_SECS: i64 = 14 * 24 * 60 * 60;

/// Issues and verifies signed session tokens with a server-held secret.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// Sign identity claims for `user`, valid for [`SESSION_TTL_SECS`].
    pub fn issue(&self, id: UserId, email: &str, name: &str, kind: RoleName) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: id,
            email: email.to_string(),
            name: name.to_string(),
            kind,
            iat: now,
            exp: now + SESSION_TTL_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "failed to sign session token");
            AppError::internal("An error occurred during authentication")
        })
    }

    /// Verify signature and expiry, recovering the claims.
    ///
    /// Fails closed: any decode, signature, or expiry problem is an
    /// authentication failure, never empty/default claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))
            .map(|data| data.claims)
            .map_err(|_| AppError::authentication("You are not authenticated!"))
    }
}
