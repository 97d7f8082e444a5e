/// Error handling for the API server
///
/// All handlers return `ApiResult<T>`. `ApiError` maps each failure kind to an
/// HTTP status and a stable error code:
///
/// | Kind                 | Status | Code                  |
/// |----------------------|--------|-----------------------|
/// | `InvalidInput`       | 400    | `invalid_input`       |
/// | `Conflict`           | 400    | `conflict`            |
/// | `InvalidCredentials` | 401    | `invalid_credentials` |
/// | `Unauthenticated`    | 401    | `unauthenticated`     |
/// | `Forbidden`          | 401    | `forbidden`           |
/// | `NotFound`           | 404    | `not_found`           |
/// | `InternalError`      | 500    | `internal_error`      |
///
/// `Forbidden` shares 401 with authentication failures to stay compatible
/// with existing clients; the code tells them apart.
///
/// # Example
///
/// ```
/// use taskly_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(name: Option<String>) -> ApiResult<Json<serde_json::Value>> {
///     let name = name.ok_or_else(|| ApiError::invalid_field("name", "Name is required"))?;
///     Ok(Json(json!({ "name": name })))
/// }
/// ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskly_shared::error::{FieldError, ServiceError};
use validator::ValidationErrors;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Missing or malformed input (400)
    InvalidInput {
        message: String,
        details: Vec<FieldError>,
    },

    /// Duplicate unique field (400)
    Conflict(String),

    /// Login failed (401)
    InvalidCredentials,

    /// No valid identity (401)
    Unauthenticated(String),

    /// Identity is not the resource owner (401)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Internal server error (500)
    InternalError(String),
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g. "invalid_input", "forbidden")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Field-level validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

impl ApiError {
    /// Single-field `InvalidInput`
    pub fn invalid_field(field: &str, message: &str) -> Self {
        ApiError::InvalidInput {
            message: message.to_string(),
            details: vec![FieldError::new(field, message)],
        }
    }

    /// Stable machine-readable code
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput { .. } => "invalid_input",
            ApiError::Conflict(_) => "conflict",
            ApiError::InvalidCredentials => "invalid_credentials",
            ApiError::Unauthenticated(_) => "unauthenticated",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::InternalError(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput { .. } | ApiError::Conflict(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials
            | ApiError::Unauthenticated(_)
            | ApiError::Forbidden(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidInput { message, .. } => write!(f, "Invalid input: {}", message),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::InvalidCredentials => write!(f, "Invalid email or password"),
            ApiError::Unauthenticated(msg) => write!(f, "Unauthenticated: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            ApiError::InvalidInput { message, details } => {
                (message, if details.is_empty() { None } else { Some(details) })
            }
            ApiError::InvalidCredentials => ("Invalid email or password".to_string(), None),
            ApiError::Conflict(msg)
            | ApiError::Unauthenticated(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg) => (msg, None),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                ("An internal error occurred".to_string(), None)
            }
        };

        let body = Json(ErrorResponse {
            error: code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::InvalidInput(details) => {
                let message = details
                    .first()
                    .map(|d| d.message.clone())
                    .unwrap_or_else(|| "Request validation failed".to_string());
                ApiError::InvalidInput { message, details }
            }
            ServiceError::Conflict(msg) => ApiError::Conflict(msg),
            ServiceError::InvalidCredentials => ApiError::InvalidCredentials,
            ServiceError::Unauthenticated(msg) => ApiError::Unauthenticated(msg),
            ServiceError::Forbidden => ApiError::Forbidden("User not authorized".to_string()),
            ServiceError::NotFound(msg) => ApiError::NotFound(msg),
            ServiceError::Internal(msg) => ApiError::InternalError(msg),
        }
    }
}

/// Convert validator derive failures into field-level details
impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| {
                    FieldError::new(
                        field.to_string(),
                        error
                            .message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| "Validation failed".to_string()),
                    )
                })
            })
            .collect();
        // HashMap order is unstable
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::InvalidInput {
            message: "Request validation failed".to_string(),
            details,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidInput {
            message: rejection.body_text(),
            details: Vec::new(),
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::InvalidInput {
            message: rejection.body_text(),
            details: Vec::new(),
        }
    }
}

/// A path id that is not a UUID cannot name an existing task
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Unparseable path parameter");
        ApiError::NotFound("Task not found".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_error_display() {
        let err = ApiError::Conflict("Email already registered".to_string());
        assert_eq!(err.to_string(), "Conflict: Email already registered");

        let err = ApiError::NotFound("Task not found".to_string());
        assert_eq!(err.to_string(), "Not found: Task not found");
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::invalid_field("title", "Title is required"), StatusCode::BAD_REQUEST, "invalid_input"),
            (ApiError::Conflict("dup".into()), StatusCode::BAD_REQUEST, "conflict"),
            (ApiError::InvalidCredentials, StatusCode::UNAUTHORIZED, "invalid_credentials"),
            (ApiError::Unauthenticated("no token".into()), StatusCode::UNAUTHORIZED, "unauthenticated"),
            (ApiError::Forbidden("nope".into()), StatusCode::UNAUTHORIZED, "forbidden"),
            (ApiError::NotFound("gone".into()), StatusCode::NOT_FOUND, "not_found"),
            (ApiError::InternalError("boom".into()), StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status(), status);
            assert_eq!(err.code(), code);
        }
    }

    #[test]
    fn test_service_error_conversion() {
        assert!(matches!(
            ApiError::from(ServiceError::Forbidden),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from(ServiceError::InvalidCredentials),
            ApiError::InvalidCredentials
        ));

        match ApiError::from(ServiceError::invalid_field("title", "Title is required")) {
            ApiError::InvalidInput { message, details } => {
                assert_eq!(message, "Title is required");
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "title");
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[derive(Validate)]
    struct SignupForm {
        #[validate(email(message = "Invalid email format"))]
        email: String,
    }

    #[test]
    fn test_validation_errors_conversion() {
        let errors = SignupForm {
            email: "not-an-email".to_string(),
        }
        .validate()
        .unwrap_err();

        match ApiError::from(errors) {
            ApiError::InvalidInput { details, .. } => {
                assert_eq!(details, vec![FieldError::new("email", "Invalid email format")]);
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::InternalError("connection refused at 10.0.0.5".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: ErrorResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.error, "internal_error");
        assert!(!json.message.contains("10.0.0.5"));
        assert!(json.details.is_none());
    }
}
