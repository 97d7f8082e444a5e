/// Request authentication guard
///
/// `AuthGuard` is the single place identity enters a request. It reads the
/// bearer token from the `Authorization` header, verifies it with the
/// [`TokenService`], resolves the subject to a stored user and returns an
/// [`AuthContext`]. The API wraps this in a middleware stage that inserts the
/// context into request extensions; handlers never derive identity from raw
/// input.
///
/// Every failure (no header, wrong scheme, bad signature, expired token,
/// deleted user) is `ServiceError::Unauthenticated`.

use std::sync::Arc;

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::token::TokenService;
use crate::error::{ServiceError, ServiceResult};
use crate::models::user::User;
use crate::repository::UserRepository;

/// Identity of the caller, attached to every protected request
///
/// # Example
///
/// ```
/// use axum::Extension;
/// use taskly_shared::auth::guard::AuthContext;
///
/// async fn handler(Extension(auth): Extension<AuthContext>) -> String {
///     format!("Hello, {}", auth.name)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
}

impl From<&User> for AuthContext {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header
///
/// The scheme is matched case-insensitively; an empty token counts as absent.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();

    if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() {
        Some(token)
    } else {
        None
    }
}

/// Verifies bearer tokens and resolves the caller
#[derive(Clone)]
pub struct AuthGuard {
    tokens: Arc<TokenService>,
    users: Arc<dyn UserRepository>,
}

impl AuthGuard {
    pub fn new(tokens: Arc<TokenService>, users: Arc<dyn UserRepository>) -> Self {
        Self { tokens, users }
    }

    /// Authenticates a request from its headers
    pub async fn authenticate(&self, headers: &HeaderMap) -> ServiceResult<AuthContext> {
        let token = bearer_token(headers).ok_or_else(|| {
            ServiceError::Unauthenticated("Missing bearer token".to_string())
        })?;

        let user_id = self.tokens.verify(token).map_err(|e| {
            tracing::info!(error = %e, "Rejected bearer token");
            ServiceError::from(e)
        })?;

        let user = self.users.find_by_id(user_id).await?.ok_or_else(|| {
            tracing::info!(user_id = %user_id, "Token subject no longer exists");
            ServiceError::Unauthenticated("User not found".to_string())
        })?;

        Ok(AuthContext::from(&user))
    }
}
