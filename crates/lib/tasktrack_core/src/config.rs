//! Authentication configuration.
//!
//! Built once at startup and shared by reference; nothing in the core reads
//! the environment.

use std::str::FromStr;

use chrono::Duration;
use jsonwebtoken::Algorithm;
use thiserror::Error;

/// Default access token lifetime: 30 minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Longest accepted access token lifetime.
pub const MAX_TOKEN_TTL_DAYS: i64 = 365;

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = bcrypt::DEFAULT_COST;

/// Configuration errors, reported at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("signing secret must not be empty")]
    EmptySecret,

    #[error("unsupported signing algorithm '{0}' (expected HS256, HS384 or HS512)")]
    UnsupportedAlgorithm(String),

    #[error("token lifetime must be positive")]
    NonPositiveTtl,

    #[error("token lifetime must be at most {MAX_TOKEN_TTL_DAYS} days")]
    TtlTooLong,

    #[error("bcrypt cost must be between 4 and 31, got {0}")]
    InvalidCost(u32),
}

/// Immutable signing and hashing settings.
#[derive(Clone)]
pub struct AuthConfig {
    secret: String,
    algorithm: Algorithm,
    token_ttl: Duration,
    bcrypt_cost: u32,
}

impl AuthConfig {
    /// Validate and build a configuration.
    ///
    /// Only symmetric HMAC algorithms are accepted since the token service
    /// signs and verifies with the same shared secret.
    pub fn new(
        secret: impl Into<String>,
        algorithm: &str,
        token_ttl: Duration,
        bcrypt_cost: u32,
    ) -> Result<Self, ConfigError> {
        let secret = secret.into();
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret);
        }
        let algorithm = match Algorithm::from_str(algorithm) {
            Ok(alg @ (Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512)) => alg,
            _ => return Err(ConfigError::UnsupportedAlgorithm(algorithm.to_string())),
        };
        if token_ttl <= Duration::zero() {
            return Err(ConfigError::NonPositiveTtl);
        }
        if token_ttl > Duration::days(MAX_TOKEN_TTL_DAYS) {
            return Err(ConfigError::TtlTooLong);
        }
        if !(4..=31).contains(&bcrypt_cost) {
            return Err(ConfigError::InvalidCost(bcrypt_cost));
        }
        Ok(Self {
            secret,
            algorithm,
            token_ttl,
            bcrypt_cost,
        })
    }

    pub fn secret(&self) -> &[u8] {
        self.secret.as_bytes()
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }

    pub fn bcrypt_cost(&self) -> u32 {
        self.bcrypt_cost
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("token_ttl", &self.token_ttl)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}
