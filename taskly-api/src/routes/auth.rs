/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/register` - Register a new user
/// - `POST /api/auth/login` - Exchange credentials for a bearer token
/// - `GET /api/auth/me` - Profile of the authenticated user

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskly_shared::{auth::guard::AuthContext, models::user::User};
use validator::Validate;

/// Register request
///
/// Missing fields deserialize as empty and are reported as `invalid_input`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Name must be at most 255 characters"))]
    pub name: String,

    #[serde(default)]
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 1024, message = "Password must be at most 1024 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[serde(default)]
    #[validate(length(max = 255, message = "Email must be at most 255 characters"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(max = 1024, message = "Password must be at most 1024 characters"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,

    pub expires_at: DateTime<Utc>,

    pub user: User,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// { "name": "Alice", "email": "alice@example.com", "password": "secret123" }
/// ```
///
/// # Response
///
/// `201 Created` with the user record (never the password hash).
///
/// # Errors
///
/// - `400 invalid_input`: Missing name, email or password
/// - `400 conflict`: Email already registered
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let Json(req) = payload?;

    // Blank fields are reported by the service with "required" messages
    if !req.email.trim().is_empty() {
        req.validate()?;
    }

    let user = state
        .auth
        .register(&req.name, &req.email, &req.password)
        .await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// { "email": "alice@example.com", "password": "secret123" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "expires_at": "2025-01-02T00:00:00Z",
///   "user": { "id": "...", "name": "Alice", "email": "alice@example.com", ... }
/// }
/// ```
///
/// # Errors
///
/// - `400 invalid_input`: Missing email or password
/// - `401 invalid_credentials`: Unknown email or wrong password
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;
    req.validate()?;

    let outcome = state.auth.login(&req.email, &req.password).await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        expires_at: outcome.expires_at,
        user: outcome.user,
    }))
}

/// Current user profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let user = state.auth.current_user(auth.user_id).await?;
    Ok(Json(user))
}
