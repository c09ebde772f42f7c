//! Application error model.

use thiserror::Error;

/// Result type used across the service layers.
pub type AppResult<T> = Result<T, AppError>;

/// Tagged application error.
///
/// The variant carries the HTTP semantics; the payload carries the
/// user-visible message. The boundary layer switches on the variant exactly
/// once; status codes are never inferred from message content.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Missing/invalid/expired credentials (401-class).
    #[error("{0}")]
    Authentication(String),

    /// Valid credentials, insufficient permission (403-class).
    #[error("{0}")]
    Authorization(String),

    /// No row for the given identifier (404-class).
    #[error("{0}")]
    NotFound(String),

    /// Uniqueness violation on create/update (409-class).
    #[error("{0}")]
    Conflict(String),

    /// Deletion blocked by live references (400-class).
    #[error("{0}")]
    InUse(String),

    /// Malformed or rejected input (400-class).
    #[error("{0}")]
    Validation(String),

    /// Unexpected infrastructure failure (500-class).
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn authentication(msg: impl Into<String>) -> Self {
        Self::Authentication(msg.into())
    }

    pub fn authorization(msg: impl Into<String>) -> Self {
        Self::Authorization(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn in_use(msg: impl Into<String>) -> Self {
        Self::InUse(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
