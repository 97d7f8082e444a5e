/// PostgreSQL connection pool and schema migrations
///
/// Only used when `DATABASE_URL` is configured; otherwise the API runs on the
/// in-memory repositories.
///
/// # Example
///
/// ```no_run
/// use taskly_shared::db::migrations::run_migrations;
/// use taskly_shared::db::pool::{create_pool, DatabaseConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = DatabaseConfig {
///         url: std::env::var("DATABASE_URL")?,
///         ..Default::default()
///     };
///
///     let pool = create_pool(config).await?;
///     run_migrations(&pool).await?;
///     Ok(())
/// }
/// ```

pub mod migrations;
pub mod pool;
