/// Authentication and identity
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`token`]: HS256 JWT issuance and verification
/// - [`service`]: Registration and login
/// - [`guard`]: Bearer token authentication of incoming requests
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id, 64 MB memory, 3 iterations by default
/// - **Tokens**: HS256, stateless, explicit expiry (24 hours by default)
/// - **Login**: One error for unknown email and wrong password
/// - **Constant-time Comparison**: Password and signature checks
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use chrono::Duration;
/// use taskly_shared::auth::password::{PasswordConfig, PasswordHasher};
/// use taskly_shared::auth::service::AuthService;
/// use taskly_shared::auth::token::{TokenConfig, TokenService};
/// use taskly_shared::repository::InMemoryUserRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = Arc::new(TokenService::new(TokenConfig {
///     secret: std::env::var("JWT_SECRET")?,
///     expires_in: Duration::hours(24),
/// })?);
/// let auth = AuthService::new(
///     Arc::new(InMemoryUserRepository::new()),
///     PasswordHasher::new(PasswordConfig::default())?,
///     tokens,
/// )?;
///
/// auth.register("Alice", "alice@example.com", "secret123").await?;
/// let login = auth.login("alice@example.com", "secret123").await?;
/// println!("token: {}", login.token);
/// # Ok(())
/// # }
/// ```

pub mod guard;
pub mod password;
pub mod service;
pub mod token;
