//! User administration handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use tasktrack_core::models::UserId;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::CurrentUser;
use crate::models::{ListQuery, UserResponse, UserUpdateRequest};
use crate::services::users;

/// `GET /api/v1/users`: list all users (admin).
pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(principal)): Extension<CurrentUser>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<UserResponse>>> {
    let resp = users::list(&state, &principal, query.into()).await?;
    Ok(Json(resp))
}

/// `PATCH /api/v1/users/{id}`: change role or active flag (admin).
pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(principal)): Extension<CurrentUser>,
    AppPath(id): AppPath<UserId>,
    AppJson(body): AppJson<UserUpdateRequest>,
) -> AppResult<Json<UserResponse>> {
    let resp = users::update(&state, &principal, id, body).await?;
    Ok(Json(resp))
}

/// `DELETE /api/v1/users/{id}`: delete a user and their tasks (admin).
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(principal)): Extension<CurrentUser>,
    AppPath(id): AppPath<UserId>,
) -> AppResult<StatusCode> {
    users::delete(&state, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
