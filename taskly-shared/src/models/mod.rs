/// Domain models for Taskly
///
/// # Models
///
/// - `user`: User accounts and credentials
/// - `task`: Owner-scoped tasks
///
/// Persistence lives behind the traits in [`crate::repository`]; these types
/// carry no storage logic beyond their `sqlx::FromRow` derives.

pub mod task;
pub mod user;
