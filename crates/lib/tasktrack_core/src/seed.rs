//! Administrator seeding.
//!
//! Guarantees at least one `admin` account exists. Run once at startup.

use thiserror::Error;
use tracing::info;

use crate::auth::CredentialError;
use crate::auth::password::hash_password_with_cost;
use crate::models::auth::{NewUser, Role};
use crate::store::{StoreError, UserStore};

/// Username given to the seeded administrator.
pub const ADMIN_USERNAME: &str = "admin";

/// Seeding errors.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What [`ensure_admin`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Created,
    AlreadyPresent,
}

/// Create the administrator account if no user with `email` exists.
///
/// An existing account with that email is left untouched, whatever its role.
pub async fn ensure_admin(
    users: &dyn UserStore,
    email: &str,
    password: &str,
    bcrypt_cost: u32,
) -> Result<SeedOutcome, SeedError> {
    if users.find_by_email(email).await?.is_some() {
        info!(email, "admin user already exists");
        return Ok(SeedOutcome::AlreadyPresent);
    }

    let password_hash = hash_password_with_cost(password, bcrypt_cost)?;
    let admin = users
        .create(NewUser {
            email: email.to_string(),
            username: ADMIN_USERNAME.to_string(),
            password_hash,
            role: Role::Admin,
            is_active: true,
        })
        .await?;

    info!(email, user_id = admin.id, "admin user created");
    Ok(SeedOutcome::Created)
}
