/// Application state and router builder
///
/// `AppState` owns the wired-up services. It is built either on PostgreSQL
/// ([`AppState::with_pool`]) or on the in-memory repositories
/// ([`AppState::in_memory`]); the router does not know which.
///
/// # Example
///
/// ```no_run
/// use taskly_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::in_memory(config)?;
/// let app = build_router(state);
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::security::SecurityHeadersLayer};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use taskly_shared::{
    auth::{
        guard::AuthGuard,
        password::PasswordHasher,
        service::AuthService,
        token::{TokenConfig, TokenService},
    },
    repository::{
        InMemoryTaskRepository, InMemoryUserRepository, PgTaskRepository, PgUserRepository,
        TaskRepository, UserRepository,
    },
    services::tasks::TaskService,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Where records are kept
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKind {
    Postgres,
    Memory,
}

impl StorageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageKind::Postgres => "postgres",
            StorageKind::Memory => "memory",
        }
    }
}

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor; every field
/// is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,

    pub tasks: TaskService,

    pub guard: AuthGuard,

    pub config: Arc<Config>,

    /// Present only on PostgreSQL storage, used by the health check
    pub db: Option<PgPool>,
}

impl AppState {
    /// Wires services on top of the given repositories
    pub fn new(
        users: Arc<dyn UserRepository>,
        tasks: Arc<dyn TaskRepository>,
        db: Option<PgPool>,
        config: Config,
    ) -> anyhow::Result<Self> {
        let hours = config.jwt.expiration_hours;
        let expires_in = chrono::Duration::try_hours(hours)
            .ok_or_else(|| anyhow::anyhow!("JWT expiration of {} hours is out of range", hours))?;
        let tokens = Arc::new(TokenService::new(TokenConfig {
            secret: config.jwt.secret.clone(),
            expires_in,
        })?);
        let hasher = PasswordHasher::new(config.password)?;

        let auth = AuthService::new(users.clone(), hasher, tokens.clone())?;
        let guard = AuthGuard::new(tokens, users);

        Ok(Self {
            auth,
            tasks: TaskService::new(tasks),
            guard,
            config: Arc::new(config),
            db,
        })
    }

    /// State backed by PostgreSQL
    pub fn with_pool(pool: PgPool, config: Config) -> anyhow::Result<Self> {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgTaskRepository::new(pool.clone())),
            Some(pool),
            config,
        )
    }

    /// State backed by process memory; data is lost on restart
    pub fn in_memory(config: Config) -> anyhow::Result<Self> {
        Self::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryTaskRepository::new()),
            None,
            config,
        )
    }

    pub fn storage(&self) -> StorageKind {
        if self.db.is_some() {
            StorageKind::Postgres
        } else {
            StorageKind::Memory
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health                    # Health check (public)
/// └── /api/
///     ├── /auth/
///     │   ├── POST /register         # public
///     │   ├── POST /login            # public
///     │   └── GET  /me               # bearer
///     └── /tasks/                    # bearer
///         ├── GET    /               # list (?status=)
///         ├── POST   /               # create
///         ├── GET    /stats          # per-status counts
///         ├── GET    /:id
///         ├── PUT    /:id
///         └── DELETE /:id
/// ```
///
/// # Middleware Stack
///
/// Applied outermost first:
/// 1. Security headers
/// 2. CORS (tower-http CorsLayer)
/// 3. Logging (tower-http TraceLayer)
/// 4. Bearer authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::middleware::auth::require_auth;
    use crate::routes;

    let auth_layer = axum::middleware::from_fn_with_state(state.clone(), require_auth);

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .merge(
            Router::new()
                .route("/me", get(routes::auth::me))
                .route_layer(auth_layer.clone()),
        );

    let task_routes = Router::new()
        .route(
            "/",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route("/stats", get(routes::tasks::task_stats))
        .route(
            "/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .route_layer(auth_layer);

    let api_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/tasks", task_routes);

    Router::new()
        .merge(health_routes)
        .nest("/api", api_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config.api.cors_origins))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}
