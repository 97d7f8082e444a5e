/// Persistence interfaces
///
/// The services only ever talk to storage through these traits, so the
/// document store behind them is opaque. Two adapters ship with the crate:
///
/// - [`postgres`]: sqlx/PostgreSQL, used in production
/// - [`memory`]: `tokio::sync::RwLock` maps, used for development and tests
///
/// # Contract
///
/// - Identifiers and timestamps are assigned by the repository.
/// - A single-record write is atomic. There are no multi-record transactions.
/// - `list_by_owner` scopes the query itself by owner and returns tasks newest
///   first; callers never filter another owner's rows out after the fact.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::task::{NewTask, Task, TaskFilter, TaskPatch};
use crate::models::user::{NewUser, User};

pub mod memory;
pub mod postgres;

pub use memory::{InMemoryTaskRepository, InMemoryUserRepository};
pub use postgres::{PgTaskRepository, PgUserRepository};

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    /// A unique constraint was violated
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Storage backend failure
    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                let what = match db_err.constraint() {
                    Some(constraint) if constraint.contains("email") => {
                        "Email already registered".to_string()
                    }
                    Some(constraint) => format!("Constraint violation: {}", constraint),
                    None => "Unique constraint violation".to_string(),
                };
                RepositoryError::Duplicate(what)
            }
            other => RepositoryError::Database(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Credential store
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user; fails with `Duplicate` if the email is taken
    async fn create(&self, data: NewUser) -> RepositoryResult<User>;

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>>;

    /// Looks up a user by an already-normalized email
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
}

/// Task store keyed by owner
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, data: NewTask) -> RepositoryResult<Task>;

    /// Loads a task regardless of owner; ownership is the caller's check
    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Task>>;

    /// Tasks owned by `owner_id`, newest first
    async fn list_by_owner(&self, owner_id: Uuid, filter: TaskFilter) -> RepositoryResult<Vec<Task>>;

    /// Applies a patch; `None` if the task no longer exists
    async fn update(&self, id: Uuid, patch: TaskPatch) -> RepositoryResult<Option<Task>>;

    /// Removes a task; `false` if it did not exist
    async fn delete(&self, id: Uuid) -> RepositoryResult<bool>;
}
