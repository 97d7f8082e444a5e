/// In-memory repositories
///
/// Backed by `tokio::sync::RwLock` maps. Used when no `DATABASE_URL` is
/// configured and throughout the test suites. Each write takes the lock once,
/// which gives the same single-record atomicity as the PostgreSQL adapter.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{RepositoryError, RepositoryResult, TaskRepository, UserRepository};
use crate::models::task::{NewTask, Task, TaskFilter, TaskPatch};
use crate::models::user::{NewUser, User};

/// In-memory credential store
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, data: NewUser) -> RepositoryResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == data.email) {
            return Err(RepositoryError::Duplicate(
                "Email already registered".to_string(),
            ));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}

#[derive(Debug, Clone)]
struct StoredTask {
    // Insertion order; breaks ties between equal `created_at` values
    seq: u64,
    task: Task,
}

/// In-memory task store
#[derive(Debug, Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<Uuid, StoredTask>>,
    next_seq: AtomicU64,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn create(&self, data: NewTask) -> RepositoryResult<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            owner_id: data.owner_id,
            title: data.title,
            description: data.description,
            status: data.status,
            priority: data.priority,
            due_date: data.due_date,
            created_at: now,
            updated_at: now,
        };

        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.tasks.write().await.insert(
            task.id,
            StoredTask {
                seq,
                task: task.clone(),
            },
        );

        Ok(task)
    }

    async fn find_by_id(&self, id: Uuid) -> RepositoryResult<Option<Task>> {
        Ok(self.tasks.read().await.get(&id).map(|s| s.task.clone()))
    }

    async fn list_by_owner(&self, owner_id: Uuid, filter: TaskFilter) -> RepositoryResult<Vec<Task>> {
        let tasks = self.tasks.read().await;

        let mut owned: Vec<&StoredTask> = tasks
            .values()
            .filter(|s| s.task.owner_id == owner_id && filter.matches(&s.task))
            .collect();
        owned.sort_by(|a, b| {
            b.task
                .created_at
                .cmp(&a.task.created_at)
                .then(b.seq.cmp(&a.seq))
        });

        Ok(owned.into_iter().map(|s| s.task.clone()).collect())
    }

    async fn update(&self, id: Uuid, patch: TaskPatch) -> RepositoryResult<Option<Task>> {
        let mut tasks = self.tasks.write().await;

        Ok(tasks.get_mut(&id).map(|stored| {
            patch.apply_to(&mut stored.task, Utc::now());
            stored.task.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> RepositoryResult<bool> {
        Ok(self.tasks.write().await.remove(&id).is_some())
    }
}
