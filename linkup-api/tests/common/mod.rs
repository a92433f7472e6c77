//! Common test utilities for integration tests
//!
//! This module provides shared infrastructure for integration tests:
//! - In-memory store seeded with a fixture user
//! - Test configuration
//! - Request helpers returning status and parsed JSON
#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use linkup_api::app::{build_router, AppState};
use linkup_api::config::{AccountConfig, ApiConfig, Config, JwtConfig, StoreConfig};
use linkup_shared::auth::password::PasswordScheme;
use linkup_shared::models::user::{CreateUser, User, UserId};
use linkup_shared::store::JsonStore;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tower::Service as _;

pub const FIXTURE_EMAIL: &str = "fixture@mailinator.com";
pub const FIXTURE_PASSWORD: &str = "fixture-password";

/// Test context containing all necessary resources
pub struct TestContext {
    pub store: Arc<JsonStore>,
    pub app: axum::Router,
    pub config: Config,

    /// Seeded user with id 1, None for empty stores
    pub fixture_user: Option<User>,
}

/// Configuration used by the integration tests
pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 3001,
            production: false,
            cors_origins: vec!["*".to_string()],
            public_base_url: "http://localhost:3001".to_string(),
        },
        store: StoreConfig {
            path: PathBuf::from("db.json"),
        },
        jwt: JwtConfig {
            secret: "test-secret-key-at-least-32-bytes-long".to_string(),
        },
        account: AccountConfig {
            password_scheme: PasswordScheme::Plaintext,
            session_fixture_user: Some(UserId::new(1)),
            email_change_token_ttl_secs: Some(86_400),
        },
    }
}

impl TestContext {
    /// Creates a context with the default test configuration
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_config(test_config()).await
    }

    /// Creates a context with a fresh in-memory store
    ///
    /// The fixture user is registered first, so it gets id 1.
    pub async fn with_config(config: Config) -> anyhow::Result<Self> {
        let store = JsonStore::in_memory();

        let fixture_user = User::create(
            &store,
            CreateUser {
                email: FIXTURE_EMAIL.to_string(),
                password: FIXTURE_PASSWORD.to_string(),
                first_name: Some("Fixture".to_string()),
                last_name: Some("User".to_string()),
            },
        )
        .await?;

        Ok(Self::build(store, config, Some(fixture_user)))
    }

    /// Creates a context over an empty store
    pub fn empty(config: Config) -> Self {
        Self::build(JsonStore::in_memory(), config, None)
    }

    fn build(store: JsonStore, config: Config, fixture_user: Option<User>) -> Self {
        let state = AppState::new(store, config.clone());
        let store = state.store.clone();
        let app = build_router(state);

        TestContext {
            store,
            app,
            config,
            fixture_user,
        }
    }

    /// Sends a request and returns the status with the JSON body (Null when empty)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        bearer: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
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
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), None).await
    }

    pub async fn patch(&self, uri: &str, body: Value, bearer: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body), bearer).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, None).await
    }

    /// Registers a user and returns its access token
    pub async fn register_and_login(&self, email: &str, password: &str) -> String {
        let (status, _) = self
            .post(
                "/auth/register",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .post(
                "/auth/login",
                serde_json::json!({ "email": email, "password": password }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);

        body["token"].as_str().unwrap().to_string()
    }
}

/// Extracts the token query parameter from a verification link
pub fn token_from_link(link: &str) -> String {
    link.split("token=").nth(1).unwrap().to_string()
}
