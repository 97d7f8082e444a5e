/// PostgreSQL repositories
///
/// sqlx-backed implementations of [`UserRepository`] and [`TaskRepository`].
/// The schema lives in `migrations/` and is applied by
/// [`crate::db::migrations::run_migrations`].
///
/// # Example
///
/// ```no_run
/// use taskly_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskly_shared::repository::{PgUserRepository, UserRepository};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let users = PgUserRepository::new(pool);
/// let found = users.find_by_email("alice@example.com").await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepositoryResult, TaskRepository, UserRepository};
use crate::models::task::{NewTask, Task, TaskFilter, TaskPatch};
use crate::models::user::{NewUser, User};

const USER_COLUMNS: &str = "id, name, email, password_hash, created_at, updated_at";

const TASK_COLUMNS: &str =
    "id, owner_id, title, description, status, priority, due_date, created_at, updated_at";

/// Credential store on PostgreSQL
#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create(&self, data: NewUser) -> RepositoryResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.name)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

/// Task store on PostgreSQL
#[derive(Debug, Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, data: NewTask) -> RepositoryResult<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (owner_id, title, description, status, priority, due_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(data.owner_id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.priority)
        .bind(data.due_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    async fn list_by_owner(&self, owner_id: Uuid, filter: TaskFilter) -> RepositoryResult<Vec<Task>> {
        let tasks = match filter.status {
            Some(status) => {
                sqlx::query_as::<_, Task>(&format!(
                    r#"
                    SELECT {TASK_COLUMNS} FROM tasks
                    WHERE owner_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    "#
                ))
                .bind(owner_id)
                .bind(status)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Task>(&format!(
                    r#"
                    SELECT {TASK_COLUMNS} FROM tasks
                    WHERE owner_id = $1
                    ORDER BY created_at DESC
                    "#
                ))
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(tasks)
    }

    async fn update(&self, id: Uuid, patch: TaskPatch) -> RepositoryResult<Option<Task>> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE tasks SET updated_at = GREATEST(NOW(), updated_at)");
        let mut bind_count = 1;

        if patch.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if patch.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if patch.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }
        if patch.priority.is_some() {
            bind_count += 1;
            query.push_str(&format!(", priority = ${}", bind_count));
        }
        if patch.due_date.is_some() {
            bind_count += 1;
            query.push_str(&format!(", due_date = ${}", bind_count));
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {TASK_COLUMNS}"));

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = patch.title {
            q = q.bind(title);
        }
        if let Some(description) = patch.description {
            q = q.bind(description);
        }
        if let Some(status) = patch.status {
            q = q.bind(status);
        }
        if let Some(priority) = patch.priority {
            q = q.bind(priority);
        }
        if let Some(due_date) = patch.due_date {
            q = q.bind(due_date);
        }

        let task = q.fetch_optional(&self.pool).await?;

        Ok(task)
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
