/// Authentication middleware
///
/// Runs the [`AuthGuard`](taskly_shared::auth::guard::AuthGuard) before any
/// protected handler. On success the resolved `AuthContext` is inserted into
/// request extensions, where handlers pick it up with
/// `Extension<AuthContext>`. On failure the request never reaches the handler
/// and the client gets `401 unauthenticated`.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::{app::AppState, error::ApiError};

/// Bearer authentication layer for `axum::middleware::from_fn_with_state`
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = state.guard.authenticate(req.headers()).await?;

    tracing::debug!(user_id = %auth_context.user_id, "Request authenticated");
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
