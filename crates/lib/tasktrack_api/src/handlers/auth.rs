//! Authentication request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, LoginCredentials};
use crate::middleware::auth::CurrentUser;
use crate::models::{RegisterRequest, TokenResponse, UserResponse};
use crate::services::auth;

/// `POST /api/v1/auth/register`: create a new user account.
pub async fn register_handler(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    let user = auth::register(&state, body).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/v1/auth/login`: authenticate with email + password.
///
/// Accepts an urlencoded or multipart password form.
pub async fn login_handler(
    State(state): State<AppState>,
    LoginCredentials(form): LoginCredentials,
) -> AppResult<Json<TokenResponse>> {
    let resp = auth::login(&state, &form.username, &form.password).await?;
    Ok(Json(resp))
}

/// `GET /api/v1/auth/me`: the authenticated user's profile.
pub async fn me_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(principal)): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = auth::me(&state, &principal).await?;
    Ok(Json(user))
}
