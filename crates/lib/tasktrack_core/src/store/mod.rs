//! User and task stores.
//!
//! The auth core only reads through [`UserStore::find_by_id`],
//! [`UserStore::find_by_email`] and [`TaskStore::find_by_id`]; the remaining
//! operations back the registration, task and admin flows in `tasktrack_api`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::auth::{NewUser, UserChanges, UserRecord};
use crate::models::task::{NewTask, TaskChanges, TaskRecord};
use crate::models::{TaskId, UnknownVariant, UserId};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint (email, username) was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// A persisted value could not be mapped to the domain model.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}

impl From<UnknownVariant> for StoreError {
    fn from(e: UnknownVariant) -> Self {
        StoreError::Corrupt(e.to_string())
    }
}

/// Paging window for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: 100,
        }
    }
}

/// Persisted users.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert a user. Fails with [`StoreError::Conflict`] on a duplicate
    /// email or username.
    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError>;

    async fn list(&self, page: Page) -> Result<Vec<UserRecord>, StoreError>;

    /// Apply role / active-flag changes. `None` if the user does not exist.
    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, StoreError>;

    /// Delete a user and every task they own. `false` if nothing was deleted.
    async fn delete(&self, id: UserId) -> Result<bool, StoreError>;
}

/// Persisted tasks.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn find_by_id(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError>;

    /// List tasks ordered by id, restricted to one owner when `owner` is set.
    async fn list(&self, owner: Option<UserId>, page: Page)
    -> Result<Vec<TaskRecord>, StoreError>;

    async fn create(&self, owner: UserId, task: NewTask) -> Result<TaskRecord, StoreError>;

    /// Apply a partial update. `None` if the task does not exist.
    async fn update(
        &self,
        id: TaskId,
        changes: TaskChanges,
    ) -> Result<Option<TaskRecord>, StoreError>;

    async fn delete(&self, id: TaskId) -> Result<bool, StoreError>;
}
