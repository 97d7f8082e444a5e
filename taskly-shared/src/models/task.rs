/// Task model
///
/// A task belongs to exactly one owner, set once at creation. Status values
/// have no server-enforced transition graph: any of the three states can be
/// set directly.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     status task_status NOT NULL DEFAULT 'pending',
///     priority task_priority NOT NULL DEFAULT 'medium',
///     due_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Task progress state
///
/// Serialized as `"Pending"`, `"In Progress"`, `"Completed"` to match the
/// web client; `"InProgress"` is accepted on input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,

    #[serde(rename = "In Progress", alias = "InProgress")]
    InProgress,

    Completed,
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
pub enum TaskPriority {
    Low,

    #[default]
    Medium,

    High,
}

/// Task model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user. Never changes after creation.
    pub owner_id: Uuid,

    pub title: String,

    pub description: String,

    pub status: TaskStatus,

    pub priority: TaskPriority,

    pub due_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for inserting a task
///
/// Built by the task service; `owner_id` always comes from the
/// authenticated identity.
#[derive(Debug, Clone)]
pub struct NewTask {
    pub owner_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

/// Partial update of a task
///
/// Only `Some` fields are applied. There is deliberately no way to express a
/// change of `id` or `owner_id`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,

    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    /// `Some(None)` clears the due date
    pub due_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }

    /// Applies the patch to a task in place and bumps `updated_at`
    ///
    /// `updated_at` never moves backwards, even if the wall clock does.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = description.clone();
        }
        if let Some(status) = self.status {
            task.status = status;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        task.updated_at = now.max(task.updated_at);
    }
}

/// Owner-scoped listing filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |status| task.status == status)
    }
}

/// Per-owner task counts for the dashboard summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
}

impl TaskStats {
    /// Counts a sequence of tasks by status
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
            stats
        })
    }
}
