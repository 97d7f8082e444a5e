/// Task endpoints
///
/// All routes sit behind the bearer guard. The owner of every operation is
/// the authenticated user from `Extension<AuthContext>`; any `owner` or `id`
/// keys in a request body are ignored.
///
/// # Endpoints
///
/// - `GET    /api/tasks[?status=]` - List own tasks, newest first
/// - `POST   /api/tasks` - Create a task
/// - `GET    /api/tasks/stats` - Per-status counts
/// - `GET    /api/tasks/:id` - Fetch one task
/// - `PUT    /api/tasks/:id` - Partial update
/// - `DELETE /api/tasks/:id` - Delete, returns `{ "id": ... }`

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use taskly_shared::{
    auth::guard::AuthContext,
    models::task::{Task, TaskFilter, TaskPatch, TaskPriority, TaskStats, TaskStatus},
    services::tasks::CreateTaskInput,
};
use uuid::Uuid;
use validator::Validate;

/// Listing query
#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    /// `Pending`, `In Progress` or `Completed`
    pub status: Option<TaskStatus>,
}

/// Create task request
///
/// The title is trimmed before its length is checked.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: String,

    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    /// `YYYY-MM-DD`
    pub due_date: Option<NaiveDate>,
}

/// Update task request
///
/// Absent fields are left unchanged; `"due_date": null` clears the due date.
/// A provided title is trimmed before its length is checked.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    #[validate(length(max = 255, message = "Title must be at most 255 characters"))]
    pub title: Option<String>,

    #[validate(length(max = 10000, message = "Description must be at most 10000 characters"))]
    pub description: Option<String>,

    pub status: Option<TaskStatus>,

    pub priority: Option<TaskPriority>,

    #[serde(default, deserialize_with = "deserialize_some")]
    pub due_date: Option<Option<NaiveDate>>,
}

/// Delete response
#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub id: Uuid,
}

// Distinguishes an explicit `null` (Some(None)) from an absent key (None)
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

impl CreateTaskRequest {
    fn trimmed(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self
    }
}

impl UpdateTaskRequest {
    fn trimmed(mut self) -> Self {
        self.title = self.title.map(|title| title.trim().to_string());
        self
    }
}

impl From<CreateTaskRequest> for CreateTaskInput {
    fn from(req: CreateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
        }
    }
}

impl From<UpdateTaskRequest> for TaskPatch {
    fn from(req: UpdateTaskRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            status: req.status,
            priority: req.priority,
            due_date: req.due_date,
        }
    }
}

/// List the caller's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    query: Result<Query<ListTasksQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Task>>> {
    let Query(query) = query?;

    let tasks = state
        .tasks
        .list(
            auth.user_id,
            TaskFilter {
                status: query.status,
            },
        )
        .await?;

    Ok(Json(tasks))
}

/// Per-status counts of the caller's tasks
pub async fn task_stats(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TaskStats>> {
    Ok(Json(state.tasks.stats(auth.user_id).await?))
}

/// Create a task
///
/// # Endpoint
///
/// ```text
/// POST /api/tasks
/// Authorization: Bearer <token>
///
/// { "title": "Report", "priority": "High", "due_date": "2025-03-01" }
/// ```
///
/// Status defaults to `Pending`, priority to `Medium`.
///
/// # Errors
///
/// - `400 invalid_input`: Missing or blank title
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let req = payload?.0.trimmed();
    req.validate()?;

    let task = state.tasks.create(auth.user_id, req.into()).await?;
    Ok(Json(task))
}

/// Fetch one of the caller's tasks
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    Ok(Json(state.tasks.get(auth.user_id, id).await?))
}

/// Partially update one of the caller's tasks
///
/// # Errors
///
/// - `400 invalid_input`: Blank title
/// - `401 forbidden`: Task belongs to another user
/// - `404 not_found`: No such task
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> ApiResult<Json<Task>> {
    let Path(id) = id?;
    let req = payload?.0.trimmed();
    req.validate()?;

    let task = state.tasks.update(auth.user_id, id, req.into()).await?;
    Ok(Json(task))
}

/// Delete one of the caller's tasks
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<DeletedResponse>> {
    let Path(id) = id?;
    let id = state.tasks.delete(auth.user_id, id).await?;
    Ok(Json(DeletedResponse { id }))
}
