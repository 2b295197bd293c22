//! Authentication middleware: Bearer token extraction and identity resolution.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use tasktrack_core::auth::guard;
use tasktrack_core::models::auth::Principal;

use crate::AppState;
use crate::error::AppError;

/// Principal resolved for this request, stored in request extensions.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Principal);

/// Extract the token from `Authorization: Bearer <token>`.
///
/// The scheme is matched case-insensitively. Any other scheme, or an empty
/// token, counts as no credential.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Axum middleware: resolves the bearer token to a principal and injects
/// [`CurrentUser`] into request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).map(str::to_owned);
    let principal = match token {
        Some(token) => Some(state.resolver.resolve(&token, Utc::now()).await?),
        None => None,
    };
    let principal = guard::require_authenticated(principal)?;

    request.extensions_mut().insert(CurrentUser(principal));

    Ok(next.run(request).await)
}
