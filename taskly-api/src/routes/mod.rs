/// API route handlers
///
/// Organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login and current user
/// - `tasks`: Owner-scoped task CRUD

pub mod auth;
pub mod health;
pub mod tasks;
