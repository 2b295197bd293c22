//! Identity resolution: bearer token → [`Principal`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use super::jwt::TokenService;
use super::{AuthError, IdentityError};
use crate::models::UserId;
use crate::models::auth::Principal;
use crate::store::UserStore;

/// Verifies a token, then loads its subject from the user store.
///
/// The principal's role always comes from the current user record, so a
/// demotion or deactivation applies to the very next request; the role claim
/// in the token is not trusted for authorization.
#[derive(Clone)]
pub struct IdentityResolver {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserStore>,
}

impl IdentityResolver {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserStore>) -> Self {
        Self { tokens, users }
    }

    pub async fn resolve(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Principal, IdentityError> {
        let claims = self.tokens.verify(token, now).inspect_err(|e| {
            debug!(reason = %e, "token rejected");
        })?;

        let Ok(user_id) = claims.sub.parse::<UserId>() else {
            debug!(sub = %claims.sub, "token subject is not a user id");
            return Err(AuthError::UnknownSubject.into());
        };

        let Some(user) = self.users.find_by_id(user_id).await? else {
            debug!(user_id, "token subject no longer exists");
            return Err(AuthError::UnknownSubject.into());
        };

        if !user.is_active {
            debug!(user_id, "token subject is inactive");
            return Err(AuthError::InactiveAccount.into());
        }

        if user.role != claims.role {
            debug!(
                user_id,
                token_role = %claims.role,
                current_role = %user.role,
                "role changed since token issuance"
            );
        }

        Ok(Principal::from(&user))
    }
}
