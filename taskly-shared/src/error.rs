/// Domain error taxonomy
///
/// Every expected, recoverable outcome of the auth and task services is a
/// `ServiceError` variant. The API crate maps each variant to a stable HTTP
/// status and error code. Anything the services cannot classify becomes
/// `ServiceError::Internal`; its detail is for logs only.
///
/// # Kinds
///
/// - `InvalidInput`: missing or malformed field (e.g. blank title)
/// - `Conflict`: duplicate unique field (e.g. email already registered)
/// - `InvalidCredentials`: login failure, same for unknown email and wrong password
/// - `Unauthenticated`: missing, malformed, forged or expired token, or unknown subject
/// - `Forbidden`: valid identity, but not the owner of the resource
/// - `NotFound`: resource identifier does not exist

use serde::{Deserialize, Serialize};

use crate::auth::password::PasswordError;
use crate::auth::token::TokenError;
use crate::repository::RepositoryError;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// A single field-level input problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field that failed validation
    pub field: String,

    /// Human-readable message
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Error type shared by the auth and task services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid input: {} field error(s)", .0.len())]
    InvalidInput(Vec<FieldError>),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("Not authorized to access this resource")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    /// Shorthand for a single-field `InvalidInput`
    pub fn invalid_field(field: &str, message: &str) -> Self {
        ServiceError::InvalidInput(vec![FieldError::new(field, message)])
    }
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Duplicate(what) => ServiceError::Conflict(what),
            RepositoryError::Database(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<TokenError> for ServiceError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Create(msg) => ServiceError::Internal(msg),
            other => ServiceError::Unauthenticated(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_maps_to_conflict() {
        let err: ServiceError = RepositoryError::Duplicate("Email already registered".into()).into();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[test]
    fn test_database_error_maps_to_internal() {
        let err: ServiceError = RepositoryError::Database("connection reset".into()).into();
        assert!(matches!(err, ServiceError::Internal(_)));
    }

    #[test]
    fn test_token_errors_are_unauthenticated() {
        let err: ServiceError = TokenError::Expired.into();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));

        let err: ServiceError = TokenError::Invalid("bad signature".into()).into();
        assert!(matches!(err, ServiceError::Unauthenticated(_)));
    }

    #[test]
    fn test_invalid_field_display() {
        let err = ServiceError::invalid_field("title", "Title is required");
        assert_eq!(err.to_string(), "Invalid input: 1 field error(s)");
    }
}
