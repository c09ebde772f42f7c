//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: storage/token wiring and the registry mutation guards
//! - `routes/`: HTTP routes + handlers (one file per resource)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: the single error-kind → status-code switch

use std::sync::Arc;

use axum::{Extension, Router};
use tower::ServiceBuilder;

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(jwt_secret: String) -> Router {
    let services = Arc::new(services::build_services(&jwt_secret).await);
    let auth_state = middleware::AuthState {
        tokens: services.tokens(),
    };

    // Protected routes: bearer token required before any handler runs.
    let protected = routes::protected().layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_middleware,
    ));

    Router::new()
        .merge(routes::public())
        .merge(protected)
        .layer(Extension(services))
        .layer(ServiceBuilder::new())
}
