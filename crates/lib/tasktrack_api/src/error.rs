//! Application error types.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection};
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE},
    response::{IntoResponse, Response},
};
use tasktrack_core::auth::{AccessError, AuthError, CredentialError, IdentityError, IssueError};
use tasktrack_core::store::StoreError;
use thiserror::Error;
use tracing::{debug, error};

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Message for every authentication failure, whatever the cause.
pub const UNAUTHORIZED_MESSAGE: &str = "Could not validate credentials";

/// Message for every authorization failure.
pub const FORBIDDEN_MESSAGE: &str = "Not enough permissions";

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The request could not be read (bad JSON, form, path or query).
    #[error("Invalid request: {message}")]
    InvalidRequest { status: StatusCode, message: String },

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, "validation_error", m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, "not_found", m.as_str()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, "conflict", m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, "unauthorized", m.as_str()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, "forbidden", m.as_str()),
            AppError::InvalidRequest { status, message } => {
                (*status, "invalid_request", message.as_str())
            }
            AppError::Internal(detail) => {
                error!(detail = %detail, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        };
        let body = Json(ErrorResponse {
            error: error.to_string(),
            message: message.to_string(),
        });
        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        // The cause stays in the logs; clients get one message for all of them.
        debug!(reason = %e, "authentication failed");
        AppError::Unauthorized(UNAUTHORIZED_MESSAGE.into())
    }
}

impl From<AccessError> for AppError {
    fn from(e: AccessError) -> Self {
        debug!(reason = %e, "authorization failed");
        AppError::Forbidden(FORBIDDEN_MESSAGE.into())
    }
}

impl From<IdentityError> for AppError {
    fn from(e: IdentityError) -> Self {
        match e {
            IdentityError::Unauthenticated(e) => AppError::from(e),
            IdentityError::Store(e) => AppError::from(e),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::Corrupt(msg) => AppError::Internal(format!("corrupt record: {msg}")),
            StoreError::Db(e) => AppError::Internal(e.to_string()),
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(e: CredentialError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<IssueError> for AppError {
    fn from(e: IssueError) -> Self {
        AppError::Internal(e.to_string())
    }
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),* $(,)?) => {$(
        impl From<$rejection> for AppError {
            fn from(rejection: $rejection) -> Self {
                AppError::InvalidRequest {
                    status: rejection.status(),
                    message: rejection.body_text(),
                }
            }
        }
    )*};
}

impl_from_rejection!(
    JsonRejection,
    FormRejection,
    PathRejection,
    QueryRejection,
    MultipartRejection,
    MultipartError,
);
