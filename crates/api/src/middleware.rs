use std::sync::Arc;

use axum::{
    extract::State,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use warden_auth::TokenService;
use warden_core::AppError;

use crate::app::errors;
use crate::context::CallerContext;

#[derive(Clone)]
pub struct AuthState {
    pub tokens: Arc<TokenService>,
}

/// Bearer-token authentication for all protected routes.
///
/// A missing or unverifiable token short-circuits with 401 before any
/// handler runs; handlers downstream can rely on `CallerContext` being
/// present.
pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let claims = match extract_bearer(req.headers()).and_then(|token| state.tokens.verify(token)) {
        Ok(claims) => claims,
        Err(err) => return errors::error_response(err),
    };

    req.extensions_mut().insert(CallerContext::new(claims));

    next.run(req).await
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, AppError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(unauthenticated)?;

    let header = header.to_str().map_err(|_| unauthenticated())?;

    let token = header.strip_prefix("Bearer ").ok_or_else(unauthenticated)?.trim();
    if token.is_empty() {
        return Err(unauthenticated());
    }

    Ok(token)
}

fn unauthenticated() -> AppError {
    AppError::authentication("You are not authenticated!")
}
