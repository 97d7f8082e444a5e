//! # Taskly API Server
//!
//! Personal task tracker: users register, log in for a bearer token and manage
//! their own tasks.
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p taskly-api
//! ```
//!
//! Without `DATABASE_URL` the server keeps everything in memory.

use anyhow::Context;
use taskly_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskly_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    tracing::info!(
        "Taskly API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;
    let bind_address = config.bind_address();

    let state = match config.database.clone() {
        Some(db) => {
            let pool = create_pool(DatabaseConfig {
                url: db.url.clone(),
                max_connections: db.max_connections,
                ..Default::default()
            })
            .await
            .context("Failed to connect to database")?;

            run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            AppState::with_pool(pool, config)?
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory storage, data will not survive a restart");
            AppState::in_memory(config)?
        }
    };

    let db = state.db.clone();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = db {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskly_api=debug,taskly_shared=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
