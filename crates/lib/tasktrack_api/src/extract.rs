//! Extractors whose rejections render as [`AppError`] bodies.

use axum::Form;
use axum::extract::{FromRequest, FromRequestParts, Multipart, Request};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;

use crate::error::AppError;
use crate::models::LoginForm;

/// `axum::Json` with `{error, message}` rejections.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

/// `axum::extract::Path` with `{error, message}` rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// `axum::extract::Query` with `{error, message}` rejections.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct AppQuery<T>(pub T);

/// Password-form login credentials, read from either an urlencoded or a
/// `multipart/form-data` body.
#[derive(Debug)]
pub struct LoginCredentials(pub LoginForm);

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|ct| {
            ct.trim_start()
                .to_ascii_lowercase()
                .starts_with("multipart/form-data")
        })
}

fn missing_field(name: &str) -> AppError {
    AppError::InvalidRequest {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        message: format!("Missing field `{name}`"),
    }
}

impl<S> FromRequest<S> for LoginCredentials
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let Form(form) = Form::<LoginForm>::from_request(req, state).await?;
            return Ok(Self(form));
        }

        let mut multipart = Multipart::from_request(req, state).await?;
        let mut username = None;
        let mut password = None;
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_owned);
            match name.as_deref() {
                Some("username") => username = Some(field.text().await?),
                Some("password") => password = Some(field.text().await?),
                _ => {}
            }
        }

        Ok(Self(LoginForm {
            username: username.ok_or_else(|| missing_field("username"))?,
            password: password.ok_or_else(|| missing_field("password"))?,
        }))
    }
}
