//! In-memory store for tests and database-less runs.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{Page, StoreError, TaskStore, UserStore};
use crate::models::auth::{NewUser, UserChanges, UserRecord};
use crate::models::task::{NewTask, TaskChanges, TaskRecord};
use crate::models::{TaskId, UserId};

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, UserRecord>,
    tasks: BTreeMap<TaskId, TaskRecord>,
    last_user_id: UserId,
    last_task_id: TaskId,
}

/// Users and tasks held in ordered maps behind a single lock.
///
/// Ids are allocated monotonically from 1 and never reused.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn window<T: Clone>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    items
        .skip(page.skip.max(0) as usize)
        .take(page.limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: UserId) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email '{}' already exists", user.email)));
        }
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(StoreError::Conflict(format!(
                "username '{}' already exists",
                user.username
            )));
        }

        tables.last_user_id += 1;
        let record = UserRecord {
            id: tables.last_user_id,
            email: user.email,
            username: user.username,
            password_hash: user.password_hash,
            role: user.role,
            is_active: user.is_active,
            created_at: Utc::now(),
        };
        tables.users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn list(&self, page: Page) -> Result<Vec<UserRecord>, StoreError> {
        let tables = self.tables.read().await;
        Ok(window(tables.users.values().cloned(), page))
    }

    async fn update(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<Option<UserRecord>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(user) = tables.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(role) = changes.role {
            user.role = role;
        }
        if let Some(is_active) = changes.is_active {
            user.is_active = is_active;
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        tables.tasks.retain(|_, task| task.user_id != id);
        Ok(true)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn find_by_id(&self, id: TaskId) -> Result<Option<TaskRecord>, StoreError> {
        Ok(self.tables.read().await.tasks.get(&id).cloned())
    }

    async fn list(
        &self,
        owner: Option<UserId>,
        page: Page,
    ) -> Result<Vec<TaskRecord>, StoreError> {
        let tables = self.tables.read().await;
        let matching = tables
            .tasks
            .values()
            .filter(|t| owner.is_none_or(|o| t.user_id == o))
            .cloned();
        Ok(window(matching, page))
    }

    async fn create(&self, owner: UserId, task: NewTask) -> Result<TaskRecord, StoreError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&owner) {
            return Err(StoreError::Conflict(format!("owner {owner} does not exist")));
        }

        tables.last_task_id += 1;
        let now = Utc::now();
        let record = TaskRecord {
            id: tables.last_task_id,
            title: task.title,
            description: task.description,
            status: task.status,
            priority: task.priority,
            user_id: owner,
            created_at: now,
            updated_at: now,
        };
        tables.tasks.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        id: TaskId,
        changes: TaskChanges,
    ) -> Result<Option<TaskRecord>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(task) = tables.tasks.get_mut(&id) else {
            return Ok(None);
        };
        task.apply(changes, Utc::now());
        Ok(Some(task.clone()))
    }

    async fn delete(&self, id: TaskId) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.tasks.remove(&id).is_some())
    }
}
