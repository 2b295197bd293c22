//! Task request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Extension, Json};
use tasktrack_core::models::TaskId;

use crate::AppState;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::CurrentUser;
use crate::models::{ListQuery, TaskCreateRequest, TaskResponse, TaskUpdateRequest};
use crate::services::tasks;

/// `GET /api/v1/tasks`: own tasks, or all tasks for admins.
pub async fn list_tasks_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(principal)): Extension<CurrentUser>,
    AppQuery(query): AppQuery<ListQuery>,
) -> AppResult<Json<Vec<TaskResponse>>> {
    let resp = tasks::list(&state, &principal, query.into()).await?;
    Ok(Json(resp))
}

/// `POST /api/v1/tasks`: create a task owned by the caller.
pub async fn create_task_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(principal)): Extension<CurrentUser>,
    AppJson(body): AppJson<TaskCreateRequest>,
) -> AppResult<(StatusCode, Json<TaskResponse>)> {
    let resp = tasks::create(&state, &principal, body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `GET /api/v1/tasks/{id}`
pub async fn get_task_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(principal)): Extension<CurrentUser>,
    AppPath(id): AppPath<TaskId>,
) -> AppResult<Json<TaskResponse>> {
    let resp = tasks::get(&state, &principal, id).await?;
    Ok(Json(resp))
}

/// `PUT /api/v1/tasks/{id}`
pub async fn update_task_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(principal)): Extension<CurrentUser>,
    AppPath(id): AppPath<TaskId>,
    AppJson(body): AppJson<TaskUpdateRequest>,
) -> AppResult<Json<TaskResponse>> {
    let resp = tasks::update(&state, &principal, id, body).await?;
    Ok(Json(resp))
}

/// `DELETE /api/v1/tasks/{id}`
pub async fn delete_task_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(principal)): Extension<CurrentUser>,
    AppPath(id): AppPath<TaskId>,
) -> AppResult<StatusCode> {
    tasks::delete(&state, &principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
