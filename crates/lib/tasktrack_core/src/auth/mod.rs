//! Authentication and authorization logic.
//!
//! Provides password hashing, JWT issuance and verification, identity
//! resolution against the user store, and the access guards that gate every
//! protected operation. Shared by `tasktrack_api` and the server's seeding
//! routine.

pub mod guard;
pub mod jwt;
pub mod password;
pub mod resolver;

use thiserror::Error;

use crate::models::auth::Role;
use crate::store::StoreError;

/// Identity could not be established.
///
/// Every variant maps to the same "unauthorized" response; the variants exist
/// for internal logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("malformed token")]
    MalformedToken,

    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token expired")]
    ExpiredToken,

    #[error("token subject does not exist")]
    UnknownSubject,

    #[error("account is inactive")]
    InactiveAccount,

    #[error("no credential supplied")]
    MissingCredential,
}

/// Identity established but privilege insufficient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("role '{actual}' does not satisfy required role '{required}'")]
    InsufficientRole { required: Role, actual: Role },

    #[error("not the owner of this resource")]
    Forbidden,
}

/// Token encoding failed. Not expected with a validated HMAC configuration.
#[derive(Debug, Error)]
#[error("token encoding failed: {0}")]
pub struct IssueError(pub String);

/// Password hashing errors. Both are internal faults.
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("malformed password hash: {0}")]
    MalformedHash(String),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

/// Failure while resolving a bearer token to a principal.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error(transparent)]
    Unauthenticated(#[from] AuthError),

    #[error("user store error: {0}")]
    Store(#[from] StoreError),
}
