/// Health check endpoint
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "storage": "postgres"
/// }
/// ```
///
/// `status` is `"degraded"` when PostgreSQL storage is configured but does
/// not answer. The in-memory store is always healthy.

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use taskly_shared::db::pool;

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,

    pub version: String,

    /// `postgres` or `memory`
    pub storage: String,
}

pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let healthy = match &state.db {
        Some(db) => match pool::health_check(db).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                false
            }
        },
        None => true,
    };

    Ok(Json(HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage().as_str().to_string(),
    }))
}
