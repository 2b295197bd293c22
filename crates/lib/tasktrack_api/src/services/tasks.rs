//! Task operations. Every read, update and delete of a single task passes the
//! owner-or-admin guard.

use tasktrack_core::auth::guard::require_owner_or_admin;
use tasktrack_core::models::TaskId;
use tasktrack_core::models::auth::Principal;
use tasktrack_core::models::task::{NewTask, TaskChanges, TaskRecord, normalize_title};
use tasktrack_core::store::Page;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{TaskCreateRequest, TaskResponse, TaskUpdateRequest};

/// Load a task and check the principal may act on it.
///
/// A missing task is reported before the ownership check.
async fn load_authorized(
    state: &AppState,
    principal: &Principal,
    id: TaskId,
) -> AppResult<TaskRecord> {
    let task = state
        .tasks
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {id} not found")))?;
    require_owner_or_admin(principal, task.user_id)?;
    Ok(task)
}

/// Admins see every task; everyone else sees their own.
pub async fn list(state: &AppState, principal: &Principal, page: Page) -> AppResult<Vec<TaskResponse>> {
    let owner = if principal.is_admin() {
        None
    } else {
        Some(principal.id)
    };
    let tasks = state.tasks.list(owner, page).await?;
    Ok(tasks.into_iter().map(TaskResponse::from).collect())
}

/// Create a task owned by the principal.
pub async fn create(
    state: &AppState,
    principal: &Principal,
    req: TaskCreateRequest,
) -> AppResult<TaskResponse> {
    let title = normalize_title(&req.title).map_err(AppError::Validation)?;
    let task = state
        .tasks
        .create(
            principal.id,
            NewTask {
                title,
                description: req.description,
                status: req.status,
                priority: req.priority,
            },
        )
        .await?;
    info!(task_id = task.id, user_id = principal.id, "task created");
    Ok(TaskResponse::from(task))
}

pub async fn get(state: &AppState, principal: &Principal, id: TaskId) -> AppResult<TaskResponse> {
    load_authorized(state, principal, id).await.map(TaskResponse::from)
}

pub async fn update(
    state: &AppState,
    principal: &Principal,
    id: TaskId,
    req: TaskUpdateRequest,
) -> AppResult<TaskResponse> {
    load_authorized(state, principal, id).await?;
    let title = req
        .title
        .as_deref()
        .map(normalize_title)
        .transpose()
        .map_err(AppError::Validation)?;
    let task = state
        .tasks
        .update(
            id,
            TaskChanges {
                title,
                description: req.description,
                status: req.status,
                priority: req.priority,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Task {id} not found")))?;
    Ok(TaskResponse::from(task))
}

pub async fn delete(state: &AppState, principal: &Principal, id: TaskId) -> AppResult<()> {
    load_authorized(state, principal, id).await?;
    if !state.tasks.delete(id).await? {
        return Err(AppError::NotFound(format!("Task {id} not found")));
    }
    info!(task_id = id, user_id = principal.id, "task deleted");
    Ok(())
}
