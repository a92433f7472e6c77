//! Application state and router builder
//!
//! This module defines the shared application state and provides
//! a function to build the Axum router with all routes and middleware.
//!
//! # Example
//!
//! ```no_run
//! use linkup_api::{app::AppState, config::Config};
//! use linkup_shared::store::JsonStore;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! let store = JsonStore::open(&config.store.path).await?;
//! let state = AppState::new(store, config);
//! let app = linkup_api::app::build_router(state);
//! # Ok(())
//! # }
//! ```

use crate::{
    config::Config,
    middleware::{security::SecurityHeadersLayer, session::session_layer},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use linkup_shared::{
    auth::{password::PasswordScheme, session::SessionResolver},
    store::JsonStore,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Record store
    pub store: Arc<JsonStore>,

    /// Application configuration
    pub config: Arc<Config>,

    /// Resolves the current user for account routes
    pub sessions: Arc<SessionResolver>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: JsonStore, config: Config) -> Self {
        let sessions = SessionResolver::new(config.jwt.secret.clone(), config.effective_fixture_user());

        Self {
            store: Arc::new(store),
            config: Arc::new(config),
            sessions: Arc::new(sessions),
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Scheme used to store newly set passwords
    pub fn password_scheme(&self) -> PasswordScheme {
        self.config.account.password_scheme
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET /health
/// ├── /auth/                          # Public
/// │   ├── POST /check-email
/// │   ├── POST /register
/// │   ├── POST /login
/// │   ├── POST /refresh
/// │   └── POST /forgot-password
/// ├── PATCH /user/update-password     # Session required
/// ├── PATCH /users/request-email-update  # Session required
/// └── GET /users/confirm-email-change # Token in query string
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
///
/// Session resolution is attached to the account routes only.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/check-email", post(routes::auth::check_email))
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/forgot-password", post(routes::auth::forgot_password));

    // route_layer so unknown paths still 404 instead of 401
    let session_routes = Router::new()
        .route("/user/update-password", patch(routes::account::update_password))
        .route(
            "/users/request-email-update",
            patch(routes::account::request_email_update),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_layer,
        ));

    let token_routes = Router::new().route(
        "/users/confirm-email-change",
        get(routes::account::confirm_email_change),
    );

    let cors = if state.config.api.cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/auth", auth_routes)
        .merge(session_routes)
        .merge(token_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
