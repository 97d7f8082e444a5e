//! Common test utilities for integration tests
//!
//! Builds the full router on in-memory repositories with cheap Argon2
//! parameters, and provides JSON request helpers.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use taskly_api::app::{build_router, AppState};
use taskly_api::config::{ApiConfig, Config, JwtConfig};
use taskly_shared::auth::password::PasswordConfig;
use tower::Service as _;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing the router under test
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
}

/// Status and parsed JSON body of a response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestContext {
    pub fn new() -> Self {
        let config = test_config();
        let state = AppState::in_memory(config.clone()).expect("Failed to build app state");

        Self {
            app: build_router(state),
            config,
        }
    }

    /// Sends a request and parses the JSON body (Null if empty)
    pub async fn send(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .app
            .clone()
            .call(builder.body(body).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn register(&self, name: &str, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/api/auth/register",
            None,
            Some(serde_json::json!({ "name": name, "email": email, "password": password })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> TestResponse {
        self.send(
            "POST",
            "/api/auth/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }

    /// Registers a user and returns a bearer token for them
    pub async fn user_token(&self, name: &str, email: &str) -> String {
        let registered = self.register(name, email, "secret123").await;
        assert_eq!(registered.status, StatusCode::CREATED, "{}", registered.body);

        let login = self.login(email, "secret123").await;
        assert_eq!(login.status, StatusCode::OK, "{}", login.body);

        login.body["token"].as_str().unwrap().to_string()
    }

    /// Creates a task and returns its JSON
    pub async fn create_task(&self, token: &str, body: Value) -> Value {
        let response = self.send("POST", "/api/tasks", Some(token), Some(body)).await;
        assert_eq!(response.status, StatusCode::OK, "{}", response.body);
        response.body
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            production: false,
        },
        database: None,
        jwt: JwtConfig {
            secret: TEST_SECRET.to_string(),
            expiration_hours: 24,
        },
        password: PasswordConfig {
            memory_kib: 8192,
            iterations: 1,
            parallelism: 1,
        },
    }
}
