//! Task domain models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{TaskId, UnknownVariant, UserId};

/// Maximum task title length, in characters.
pub const TITLE_MAX_CHARS: usize = 200;

/// Task workflow status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(TaskStatus::Pending),
            "in_progress" => Ok(TaskStatus::InProgress),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(UnknownVariant::new("task status", other)),
        }
    }
}

/// Task priority.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskPriority {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(UnknownVariant::new("task priority", other)),
        }
    }
}

/// Persisted task. `user_id` is the owner and never changes after creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRecord {
    pub id: TaskId,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TaskRecord {
    /// Apply a partial update in place. Ownership is not part of the patch.
    pub fn apply(&mut self, changes: TaskChanges, now: DateTime<Utc>) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = Some(description);
        }
        if let Some(status) = changes.status {
            self.status = status;
        }
        if let Some(priority) = changes.priority {
            self.priority = priority;
        }
        self.updated_at = now;
    }
}

/// Fields needed to insert a task. The owner is supplied separately.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
}

/// Partial task update. `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
}

/// Trim a task title and check it is 1..=200 characters. Returns the
/// trimmed title, which is what gets stored.
pub fn normalize_title(title: &str) -> Result<String, String> {
    let title = title.trim();
    let len = title.chars().count();
    if len == 0 {
        return Err("Title must not be empty".into());
    }
    if len > TITLE_MAX_CHARS {
        return Err(format!("Title must be at most {TITLE_MAX_CHARS} characters"));
    }
    Ok(title.to_string())
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn record() -> TaskRecord {
        let t0 = Utc::now();
        TaskRecord {
            id: 1,
            title: "write report".into(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            user_id: 5,
            created_at: t0,
            updated_at: t0,
        }
    }

    #[test]
    fn status_wire_names_match_storage_names() {
        for status in [TaskStatus::Pending, TaskStatus::InProgress, TaskStatus::Completed] {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("done".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn defaults_are_pending_and_medium() {
        let task = NewTask::default();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, TaskPriority::Medium);
    }

    #[test]
    fn apply_only_touches_given_fields() {
        let mut task = record();
        let later = task.updated_at + Duration::seconds(10);
        task.apply(
            TaskChanges {
                status: Some(TaskStatus::Completed),
                ..Default::default()
            },
            later,
        );
        assert_eq!(task.title, "write report");
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.user_id, 5);
        assert_eq!(task.updated_at, later);
    }

    #[test]
    fn title_bounds() {
        assert_eq!(normalize_title("a").unwrap(), "a");
        assert!(normalize_title("   ").is_err());
        assert!(normalize_title(&"x".repeat(200)).is_ok());
        assert!(normalize_title(&"x".repeat(201)).is_err());
    }

    #[test]
    fn padded_title_is_stored_trimmed() {
        let padded = format!("  {}  ", "x".repeat(TITLE_MAX_CHARS));
        let title = normalize_title(&padded).unwrap();
        assert_eq!(title.chars().count(), TITLE_MAX_CHARS);
        assert_eq!(normalize_title("  write report\n").unwrap(), "write report");
    }
}
