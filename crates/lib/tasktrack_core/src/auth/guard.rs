//! Access guards applied after identity resolution.
//!
//! Pure functions: no I/O, no panics.

use super::{AccessError, AuthError};
use crate::models::UserId;
use crate::models::auth::{Principal, Role};

/// Require a resolved principal. `None` means no credential was supplied.
pub fn require_authenticated(principal: Option<Principal>) -> Result<Principal, AuthError> {
    principal.ok_or(AuthError::MissingCredential)
}

/// Require `principal.role >= minimum`.
pub fn require_role(principal: &Principal, minimum: Role) -> Result<(), AccessError> {
    if principal.role >= minimum {
        Ok(())
    } else {
        Err(AccessError::InsufficientRole {
            required: minimum,
            actual: principal.role,
        })
    }
}

/// Require the principal to own the resource, or to be an admin.
pub fn require_owner_or_admin(
    principal: &Principal,
    resource_owner_id: UserId,
) -> Result<(), AccessError> {
    if principal.role == Role::Admin || principal.id == resource_owner_id {
        Ok(())
    } else {
        Err(AccessError::Forbidden)
    }
}
