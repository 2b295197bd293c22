//! Domain models.
//!
//! These are internal domain models, distinct from the API request/response
//! shapes in `tasktrack_api`.

pub mod auth;
pub mod task;

use thiserror::Error;

/// User identifier (`users.id`).
pub type UserId = i64;

/// Task identifier (`tasks.id`).
pub type TaskId = i64;

/// A persisted string did not match any variant of a closed enum.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

impl UnknownVariant {
    pub(crate) fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}
