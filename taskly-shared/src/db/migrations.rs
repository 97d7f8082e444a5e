/// Schema migrations
///
/// Migration files live in `taskly-shared/migrations/` and are embedded at
/// compile time with `sqlx::migrate!`, so the binary carries its own schema.

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Applies every pending migration
///
/// # Errors
///
/// Returns an error if a migration fails or a previously applied migration
/// was edited.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("Database migrations complete");
            Ok(())
        }
        Err(e) => {
            warn!(error = %e, "Migration failed");
            Err(e)
        }
    }
}

/// Number of successfully applied migrations
pub async fn applied_migrations(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = true")
        .fetch_one(pool)
        .await
}
