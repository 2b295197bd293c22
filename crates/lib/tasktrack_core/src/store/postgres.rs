//! PostgreSQL-backed store.
//!
//! Role, status and priority are stored as text and parsed back into closed
//! enums here, so an unexpected value surfaces as [`StoreError::Corrupt`]
//! instead of reaching the auth core.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::{Page, StoreError, TaskStore, UserStore};
use crate::models::auth::{NewUser, UserChanges, UserRecord};
use crate::models::task::{NewTask, TaskChanges, TaskRecord};
use crate::models::{TaskId, UserId};

const USER_COLUMNS: &str = "id, email, username, hashed_password, role, is_active, created_at";

const TASK_COLUMNS: &str =
    "id, title, description, status, priority, user_id, created_at, updated_at";

type UserRow = (i64, String, String, String, String, bool, DateTime<Utc>);

type TaskRow = (
    i64,
    String,
    Option<String>,
    String,
    String,
    i64,
    DateTime<Utc>,
    DateTime<Utc>,
);

fn user_from_row(row: UserRow) -> Result<UserRecord, StoreError> {
    let (id, email, username, password_hash, role, is_active, created_at) = row;
    Ok(UserRecord {
        id,
        email,
        username,
        password_hash,
        role: role.parse()?,
        is_active,
        created_at,
    })
}

fn task_from_row(row: TaskRow) -> Result<TaskRecord, StoreError> {
    let (id, title, description, status, priority, user_id, created_at, updated_at) = row;
    Ok(TaskRecord {
        id,
        title,
        description,
        status: status.parse()?,
        priority: priority.parse()?,
        user_id,
        created_at,
        updated_at,
    })
}

/// Map constraint violations on insert to [`StoreError::Conflict`].
fn write_error(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() || db.is_foreign_key_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        _ => StoreError::Db(e),
    }
}

/// Users and tasks in PostgreSQL.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_user(&self, filter: &str, value: &str) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {filter} = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        row.map(user_from_row).transpose()
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(user_from_row).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        self.fetch_user("email", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.fetch_user("username", username).await
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let sql = format!(
            "INSERT INTO users (email, username, hashed_password, role, is_active) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(&user.email)
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .bind(user.is_active)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;
        user_from_row(row)
    }

    async fn list(&self, page: Page) -> Result<Vec<UserRecord>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users ORDER BY id OFFSET $1 LIMIT $2");
        let rows = sqlx::query_as::<_, UserRow>(&sql)
            .bind(page.skip)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(user_from_row).collect()
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, StoreError> {
        let sql = format!(
            "UPDATE users SET role = COALESCE($2, role), \
                              is_active = COALESCE($3, is_active), \
                              updated_at = now() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .bind(changes.role.map(|r| r.as_str()))
            .bind(changes.is_active)
            .fetch_optional(&self.pool)
            .await?;
        row.map(user_from_row).transpose()
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        // tasks.user_id cascades
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn find_by_id(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(task_from_row).transpose()
    }

    async fn list(
        &self,
        owner: Option<UserId>,
        page: Page,
    ) -> Result<Vec<TaskRecord>, StoreError> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE ($1::BIGINT IS NULL OR user_id = $1) \
             ORDER BY id OFFSET $2 LIMIT $3"
        );
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(owner)
            .bind(page.skip)
            .bind(page.limit)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(task_from_row).collect()
    }

    async fn create(&self, owner: UserId, task: NewTask) -> Result<TaskRecord, StoreError> {
        let sql = format!(
            "INSERT INTO tasks (title, description, status, priority, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {TASK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status.as_str())
            .bind(task.priority.as_str())
            .bind(owner)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;
        task_from_row(row)
    }

    async fn update(
        &self,
        id: TaskId,
        changes: TaskChanges,
    ) -> Result<Option<TaskRecord>, StoreError> {
        let sql = format!(
            "UPDATE tasks SET title = COALESCE($2, title), \
                              description = COALESCE($3, description), \
                              status = COALESCE($4, status), \
                              priority = COALESCE($5, priority), \
                              updated_at = now() \
             WHERE id = $1 RETURNING {TASK_COLUMNS}"
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.status.map(|s| s.as_str()))
            .bind(changes.priority.map(|p| p.as_str()))
            .fetch_optional(&self.pool)
            .await?;
        row.map(task_from_row).transpose()
    }

    async fn delete(&self, id: TaskId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;
    use crate::models::task::{TaskPriority, TaskStatus};

    #[test]
    fn user_row_maps_role() {
        let now = Utc::now();
        let row: UserRow = (
            3,
            "a@example.com".into(),
            "a".into(),
            "$2b$04$x".into(),
            "admin".into(),
            true,
            now,
        );
        let user = user_from_row(row).unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.id, 3);
    }

    #[test]
    fn unknown_role_is_corrupt() {
        let row: UserRow = (
            3,
            "a@example.com".into(),
            "a".into(),
            "$2b$04$x".into(),
            "superuser".into(),
            true,
            Utc::now(),
        );
        assert!(matches!(user_from_row(row), Err(StoreError::Corrupt(_))));
    }

    #[test]
    fn task_row_maps_enums() {
        let now = Utc::now();
        let row: TaskRow = (
            1,
            "t".into(),
            None,
            "in_progress".into(),
            "high".into(),
            9,
            now,
            now,
        );
        let task = task_from_row(row).unwrap();
        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.priority, TaskPriority::High);

        let bad: TaskRow = (1, "t".into(), None, "done".into(), "high".into(), 9, now, now);
        assert!(matches!(task_from_row(bad), Err(StoreError::Corrupt(_))));
    }
}
