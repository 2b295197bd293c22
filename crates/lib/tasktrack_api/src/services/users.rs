//! User administration. Admin only.

use tasktrack_core::auth::guard::require_role;
use tasktrack_core::models::UserId;
use tasktrack_core::models::auth::{Principal, Role, UserChanges};
use tasktrack_core::store::Page;
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{UserResponse, UserUpdateRequest};

pub async fn list(state: &AppState, principal: &Principal, page: Page) -> AppResult<Vec<UserResponse>> {
    require_role(principal, Role::Admin)?;
    let users = state.users.list(page).await?;
    Ok(users.into_iter().map(UserResponse::from).collect())
}

/// Change a user's role or active flag. Applies from that user's next request.
///
/// Admins cannot change their own role or flag, so the last admin cannot lock
/// themself out.
pub async fn update(
    state: &AppState,
    principal: &Principal,
    id: UserId,
    req: UserUpdateRequest,
) -> AppResult<UserResponse> {
    require_role(principal, Role::Admin)?;
    if id == principal.id {
        return Err(AppError::Validation(
            "Admins cannot change their own role or status".into(),
        ));
    }
    let user = state
        .users
        .update(
            id,
            UserChanges {
                role: req.role,
                is_active: req.is_active,
            },
        )
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {id} not found")))?;

    info!(
        user_id = id,
        role = %user.role,
        is_active = user.is_active,
        by = principal.id,
        "user updated"
    );
    Ok(UserResponse::from(user))
}

/// Delete a user and all of their tasks.
pub async fn delete(state: &AppState, principal: &Principal, id: UserId) -> AppResult<()> {
    require_role(principal, Role::Admin)?;
    if id == principal.id {
        return Err(AppError::Validation(
            "Admins cannot delete their own account".into(),
        ));
    }
    if !state.users.delete(id).await? {
        return Err(AppError::NotFound(format!("User {id} not found")));
    }
    info!(user_id = id, by = principal.id, "user deleted");
    Ok(())
}
