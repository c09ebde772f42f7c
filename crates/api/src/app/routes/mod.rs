use axum::{Router, routing::get};

pub mod auth;
pub mod dashboard;
pub mod permissions;
pub mod roles;
pub mod system;
pub mod users;

/// Router for unauthenticated endpoints.
pub fn public() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .nest("/auth", auth::router())
}

/// Router for all token-protected endpoints.
pub fn protected() -> Router {
    Router::new()
        .nest("/user", users::router())
        .nest("/permission", permissions::router())
        .nest("/role", roles::router())
        .nest("/dashboard", dashboard::router())
}
