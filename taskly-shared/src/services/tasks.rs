/// Owner-scoped task operations
///
/// Every operation takes the acting user's id from the authenticated
/// [`AuthContext`](crate::auth::guard::AuthContext), never from request input.
///
/// # Ownership check order
///
/// Operations on a single task follow the same sequence:
///
/// ```text
/// load by id ── absent ──────────────> NotFound
///     │
///     └─ owner != caller ───────────> Forbidden
///            │
///            └─ validate input ─────> InvalidInput
///                   │
///                   └─ mutate / return
/// ```
///
/// The owner comparison happens before the patch is even looked at, so a
/// forbidden request learns nothing about the record's fields. Concurrent
/// updates by the same owner are last-write-wins.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::{FieldError, ServiceError, ServiceResult};
use crate::models::task::{NewTask, Task, TaskFilter, TaskPatch, TaskPriority, TaskStats, TaskStatus};
use crate::repository::TaskRepository;

/// Fields accepted when creating a task
#[derive(Debug, Clone, Default)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
}

/// Task CRUD with ownership enforcement
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>) -> Self {
        Self { tasks }
    }

    /// Lists the caller's tasks, newest first
    pub async fn list(&self, owner_id: Uuid, filter: TaskFilter) -> ServiceResult<Vec<Task>> {
        Ok(self.tasks.list_by_owner(owner_id, filter).await?)
    }

    /// Counts the caller's tasks by status
    pub async fn stats(&self, owner_id: Uuid) -> ServiceResult<TaskStats> {
        let tasks = self.tasks.list_by_owner(owner_id, TaskFilter::default()).await?;
        Ok(TaskStats::tally(&tasks))
    }

    /// Fetches one of the caller's tasks
    pub async fn get(&self, owner_id: Uuid, task_id: Uuid) -> ServiceResult<Task> {
        self.load_owned(owner_id, task_id).await
    }

    /// Creates a task owned by the caller
    pub async fn create(&self, owner_id: Uuid, input: CreateTaskInput) -> ServiceResult<Task> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ServiceError::invalid_field("title", "Title is required"));
        }

        let task = self
            .tasks
            .create(NewTask {
                owner_id,
                title: title.to_string(),
                description: input.description.unwrap_or_default(),
                status: input.status.unwrap_or_default(),
                priority: input.priority.unwrap_or_default(),
                due_date: input.due_date,
            })
            .await?;

        tracing::debug!(task_id = %task.id, owner_id = %owner_id, "Task created");
        Ok(task)
    }

    /// Applies a partial update to one of the caller's tasks
    ///
    /// An empty patch is a no-op and returns the task untouched.
    pub async fn update(&self, owner_id: Uuid, task_id: Uuid, mut patch: TaskPatch) -> ServiceResult<Task> {
        let current = self.load_owned(owner_id, task_id).await?;
        if patch.is_empty() {
            return Ok(current);
        }

        if let Some(title) = patch.title.take() {
            let title = title.trim();
            if title.is_empty() {
                return Err(ServiceError::InvalidInput(vec![FieldError::new(
                    "title",
                    "Title cannot be empty",
                )]));
            }
            patch.title = Some(title.to_string());
        }

        let task = self
            .tasks
            .update(task_id, patch)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

        tracing::debug!(task_id = %task_id, owner_id = %owner_id, "Task updated");
        Ok(task)
    }

    /// Deletes one of the caller's tasks, returning its id
    pub async fn delete(&self, owner_id: Uuid, task_id: Uuid) -> ServiceResult<Uuid> {
        self.load_owned(owner_id, task_id).await?;

        if !self.tasks.delete(task_id).await? {
            return Err(ServiceError::NotFound("Task not found".to_string()));
        }

        tracing::debug!(task_id = %task_id, owner_id = %owner_id, "Task deleted");
        Ok(task_id)
    }

    async fn load_owned(&self, owner_id: Uuid, task_id: Uuid) -> ServiceResult<Task> {
        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Task not found".to_string()))?;

        if task.owner_id != owner_id {
            tracing::warn!(
                task_id = %task_id,
                caller = %owner_id,
                "Rejected access to task owned by another user"
            );
            return Err(ServiceError::Forbidden);
        }

        Ok(task)
    }
}
