/// Configuration management for the API server
///
/// Loads configuration from environment variables (and a `.env` file if
/// present) into a type-safe struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `PRODUCTION`: Enables HSTS when `true` (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string; in-memory storage if unset
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for token signing (required, at least 32 chars)
/// - `JWT_EXPIRATION_HOURS`: Token lifetime, 1 to 8760 (default: 24)
/// - `ARGON2_MEMORY_KIB`, `ARGON2_ITERATIONS`, `ARGON2_PARALLELISM`:
///   Password hashing cost (default: 65536 / 3 / 4)
/// - `RUST_LOG`: Log filter; `LOG_FORMAT=json` switches to JSON logs
///
/// # Example
///
/// ```no_run
/// use taskly_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::env;
use std::str::FromStr;

use anyhow::Context;
use taskly_shared::auth::password::PasswordConfig;
use taskly_shared::auth::token::{DEFAULT_EXPIRATION_HOURS, MAX_EXPIRATION_HOURS, MIN_SECRET_LEN};

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,

    /// `None` selects the in-memory repositories
    pub database: Option<DatabaseConfig>,

    pub jwt: JwtConfig,

    pub password: PasswordConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,

    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,

    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// HS256 signing secret
    ///
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub expiration_hours: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or too short, or if any
    /// numeric variable fails to parse.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = parse_var("API_PORT", 8080u16)?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let production = env::var("PRODUCTION")
            .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
            .unwrap_or(false);

        let database = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 10u32)?,
            }),
            _ => None,
        };

        let secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }

        let expiration_hours =
            check_expiration_hours(parse_var("JWT_EXPIRATION_HOURS", DEFAULT_EXPIRATION_HOURS)?)?;

        let defaults = PasswordConfig::default();
        let password = PasswordConfig {
            memory_kib: parse_var("ARGON2_MEMORY_KIB", defaults.memory_kib)?,
            iterations: parse_var("ARGON2_ITERATIONS", defaults.iterations)?,
            parallelism: parse_var("ARGON2_PARALLELISM", defaults.parallelism)?,
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database,
            jwt: JwtConfig {
                secret,
                expiration_hours,
            },
            password,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn check_expiration_hours(hours: i64) -> anyhow::Result<i64> {
    if !(1..=MAX_EXPIRATION_HOURS).contains(&hours) {
        anyhow::bail!(
            "JWT_EXPIRATION_HOURS must be between 1 and {}, got {}",
            MAX_EXPIRATION_HOURS,
            hours
        );
    }
    Ok(hours)
}

fn parse_var<T>(name: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", name, value)),
        Err(_) => Ok(default),
    }
}
