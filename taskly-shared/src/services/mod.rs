/// Business services built on the repositories
///
/// - `tasks`: Owner-scoped task CRUD

pub mod tasks;
