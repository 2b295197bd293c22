//! Authentication service: registration, login and current-user lookup.
//!
//! bcrypt runs on the blocking pool so hashing never stalls the async
//! workers.

use chrono::Utc;
use tasktrack_core::auth::password;
use tasktrack_core::models::auth::{NewUser, Principal, Role};
use tracing::info;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{RegisterRequest, TokenResponse, UserResponse};

/// Username length bounds, in characters.
const USERNAME_MIN_CHARS: usize = 3;
const USERNAME_MAX_CHARS: usize = 50;

/// Password length bounds, in characters.
const PASSWORD_MIN_CHARS: usize = 6;
const PASSWORD_MAX_CHARS: usize = 100;

/// Plaintext hashed once at startup; login verifies against it when the email
/// is unknown so both failure paths cost one bcrypt verification.
pub(crate) const TIMING_DUMMY_PASSWORD: &str = "tasktrack-timing-dummy";

const INVALID_CREDENTIALS: &str = "Incorrect email or password";

// ---------------------------------------------------------------------------
// Password hashing (blocking pool)
// ---------------------------------------------------------------------------

/// Hash a password with the configured bcrypt cost.
pub async fn hash_password(state: &AppState, password: &str) -> AppResult<String> {
    let plaintext = password.to_string();
    let cost = state.config.auth.bcrypt_cost();
    tokio::task::spawn_blocking(move || password::hash_password_with_cost(&plaintext, cost))
        .await
        .map_err(|e| AppError::Internal(format!("hash task: {e}")))?
        .map_err(AppError::from)
}

/// Verify a password against a stored bcrypt hash.
pub async fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let plaintext = password.to_string();
    let hash = hash.to_string();
    tokio::task::spawn_blocking(move || password::verify_password(&plaintext, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("verify task: {e}")))?
        .map_err(AppError::from)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Trim and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> AppResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation("Invalid email address".into()))
    }
}

fn validate_registration(req: &RegisterRequest, email: &str, username: &str) -> AppResult<()> {
    validate_email(email)?;

    let username_len = username.chars().count();
    if !(USERNAME_MIN_CHARS..=USERNAME_MAX_CHARS).contains(&username_len) {
        return Err(AppError::Validation(format!(
            "Username must be between {USERNAME_MIN_CHARS} and {USERNAME_MAX_CHARS} characters"
        )));
    }

    let password_len = req.password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&password_len) {
        return Err(AppError::Validation(format!(
            "Password must be between {PASSWORD_MIN_CHARS} and {PASSWORD_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Public auth operations
// ---------------------------------------------------------------------------

/// Register a new account with role `user`.
pub async fn register(state: &AppState, req: RegisterRequest) -> AppResult<UserResponse> {
    let email = normalize_email(&req.email);
    let username = req.username.trim().to_string();
    validate_registration(&req, &email, &username)?;

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Validation("Email already registered".into()));
    }
    if state.users.find_by_username(&username).await?.is_some() {
        return Err(AppError::Validation("Username already taken".into()));
    }

    let password_hash = hash_password(state, &req.password).await?;
    let user = state
        .users
        .create(NewUser {
            email,
            username,
            password_hash,
            role: Role::User,
            is_active: true,
        })
        .await?;

    info!(user_id = user.id, "user registered");
    Ok(UserResponse::from(user))
}

/// Authenticate with email + password and issue an access token.
///
/// Unknown email, wrong password and inactive account all produce the same
/// error.
pub async fn login(state: &AppState, email: &str, password: &str) -> AppResult<TokenResponse> {
    let email = normalize_email(email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        verify_password(password, &state.dummy_hash).await?;
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(password, &user.password_hash).await? || !user.is_active {
        return Err(AppError::Unauthorized(INVALID_CREDENTIALS.into()));
    }

    let access_token = state
        .tokens
        .issue(&user.id.to_string(), user.role, Utc::now())?;

    info!(user_id = user.id, "user logged in");
    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.tokens.ttl_secs(),
    })
}

/// Current user's profile.
pub async fn me(state: &AppState, principal: &Principal) -> AppResult<UserResponse> {
    let user = state
        .users
        .find_by_id(principal.id)
        .await?
        .ok_or_else(|| AppError::Unauthorized(crate::error::UNAUTHORIZED_MESSAGE.into()))?;
    Ok(UserResponse::from(user))
}
