//! Password hashing via bcrypt.

use super::CredentialError;
use crate::config::DEFAULT_BCRYPT_COST;

/// Hash a password with bcrypt at the default cost.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    hash_password_with_cost(password, DEFAULT_BCRYPT_COST)
}

/// Hash a password with bcrypt at the given cost. Each call draws a fresh salt.
pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, CredentialError> {
    bcrypt::hash(password, cost).map_err(|e| CredentialError::Hash(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash.
///
/// Returns `Ok(false)` on mismatch. Errors only if the stored hash cannot be
/// parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, CredentialError> {
    bcrypt::verify(password, hash)
        .map_err(|e| CredentialError::MalformedHash(format!("bcrypt verify: {e}")))
}
