//! JWT token issuance and verification.
//!
//! Tokens are compact HMAC-signed JWTs. The caller supplies the current time
//! so expiry decisions are deterministic; the library's own clock check is
//! disabled.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use super::{AuthError, IssueError};
use crate::config::AuthConfig;
use crate::models::auth::{Role, TokenClaims};

/// Issues and verifies access tokens with a process-wide secret.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    ttl: chrono::Duration,
}

impl TokenService {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret()),
            decoding_key: DecodingKey::from_secret(config.secret()),
            algorithm: config.algorithm(),
            ttl: config.token_ttl(),
        }
    }

    /// Token lifetime in seconds.
    pub fn ttl_secs(&self) -> i64 {
        self.ttl.num_seconds()
    }

    /// Build and sign claims `{sub, role, iat = now, exp = now + ttl}`.
    pub fn issue(&self, subject: &str, role: Role, now: DateTime<Utc>) -> Result<String, IssueError> {
        let exp = now
            .checked_add_signed(self.ttl)
            .ok_or_else(|| IssueError(format!("expiry overflows for issue time {now}")))?;
        let claims = TokenClaims {
            sub: subject.to_string(),
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| IssueError(format!("jwt encode: {e}")))
    }

    /// Verify a token and return its claims.
    ///
    /// The signature is checked before any claim is deserialized. A token is
    /// still valid at exactly `now == exp` and expired one second later.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<TokenClaims, AuthError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["exp", "sub"]);

        let claims = decode::<TokenClaims>(token, &self.decoding_key, &validation)
            .map_err(|e| classify(e.kind()))?
            .claims;

        if now.timestamp() > claims.exp {
            return Err(AuthError::ExpiredToken);
        }
        Ok(claims)
    }
}

fn classify(kind: &ErrorKind) -> AuthError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => AuthError::InvalidSignature,
        ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
        _ => AuthError::MalformedToken,
    }
}
