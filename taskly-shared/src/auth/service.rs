/// Registration and login
///
/// `AuthService` ties the credential store, the password hasher and the token
/// service together.
///
/// Login failures are deliberately undifferentiated: an unknown email and a
/// wrong password both produce `ServiceError::InvalidCredentials`, and both
/// paths pay for one Argon2 verification, so neither the response nor its
/// timing reveals whether an account exists.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::password::PasswordHasher;
use super::token::TokenService;
use crate::error::{FieldError, ServiceError, ServiceResult};
use crate::models::user::{normalize_email, NewUser, User};
use crate::repository::{RepositoryError, UserRepository};

/// Successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub user: User,
}

/// Orchestrates registration and login
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    hasher: PasswordHasher,
    tokens: Arc<TokenService>,
    // Verified against when the email is unknown
    dummy_hash: Arc<str>,
}

impl AuthService {
    /// Creates the service
    ///
    /// Hashes a throwaway password once so that logins for unknown emails can
    /// run a real verification.
    pub fn new(
        users: Arc<dyn UserRepository>,
        hasher: PasswordHasher,
        tokens: Arc<TokenService>,
    ) -> ServiceResult<Self> {
        let dummy_hash = hasher.hash("taskly-timing-equalizer")?;

        Ok(Self {
            users,
            hasher,
            tokens,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Registers a new user
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if name, email or password is blank
    /// - `Conflict` if the email is already registered
    pub async fn register(&self, name: &str, email: &str, password: &str) -> ServiceResult<User> {
        let name = name.trim();
        let email = normalize_email(email);

        let mut errors = Vec::new();
        if name.is_empty() {
            errors.push(FieldError::new("name", "Name is required"));
        }
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        }
        if password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }
        if !errors.is_empty() {
            return Err(ServiceError::InvalidInput(errors));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            tracing::info!("Registration rejected: email already registered");
            return Err(ServiceError::Conflict("Email already registered".to_string()));
        }

        let password_hash = self.hasher.hash(password)?;

        // The unique constraint still catches a concurrent registration
        let user = self
            .users
            .create(NewUser {
                name: name.to_string(),
                email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                RepositoryError::Duplicate(_) => {
                    ServiceError::Conflict("Email already registered".to_string())
                }
                other => other.into(),
            })?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    /// Authenticates a user and issues a token
    ///
    /// # Errors
    ///
    /// - `InvalidInput` if email or password is blank
    /// - `InvalidCredentials` for an unknown email or a wrong password
    pub async fn login(&self, email: &str, password: &str) -> ServiceResult<LoginOutcome> {
        let email = normalize_email(email);

        let mut errors = Vec::new();
        if email.is_empty() {
            errors.push(FieldError::new("email", "Email is required"));
        }
        if password.is_empty() {
            errors.push(FieldError::new("password", "Password is required"));
        }
        if !errors.is_empty() {
            return Err(ServiceError::InvalidInput(errors));
        }

        let user = match self.users.find_by_email(&email).await? {
            Some(user) => user,
            None => {
                let _ = self.hasher.verify(password, &self.dummy_hash);
                tracing::warn!("Login failed: invalid credentials");
                return Err(ServiceError::InvalidCredentials);
            }
        };

        if !self.hasher.verify(password, &user.password_hash) {
            tracing::warn!("Login failed: invalid credentials");
            return Err(ServiceError::InvalidCredentials);
        }

        let issued = self.tokens.issue(user.id)?;

        tracing::info!(user_id = %user.id, "User logged in");
        Ok(LoginOutcome {
            token: issued.token,
            expires_at: issued.expires_at,
            user,
        })
    }

    /// Loads the profile of an authenticated user
    pub async fn current_user(&self, user_id: Uuid) -> ServiceResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::Unauthenticated("User no longer exists".to_string()))
    }
}
