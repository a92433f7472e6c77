//! Configuration management for the API server
//!
//! This module loads configuration from environment variables and provides
//! a type-safe configuration struct.
//!
//! # Environment Variables
//!
//! - `API_HOST`: Host to bind to (default: 0.0.0.0)
//! - `API_PORT`: Port to bind to (default: 3001)
//! - `API_PRODUCTION`: Production mode (default: false)
//! - `CORS_ORIGINS`: Comma-separated allowed origins (default: *)
//! - `PUBLIC_BASE_URL`: Base URL used in verification links (default: http://localhost:3001)
//! - `STORE_PATH`: JSON store file (default: db.json)
//! - `JWT_SECRET`: Secret key for JWT signing (required, at least 32 characters)
//! - `PASSWORD_SCHEME`: `plaintext` or `argon2` (default: plaintext)
//! - `SESSION_FIXTURE_USER_ID`: User acting as "current user" when no token is sent (default: 1, empty disables)
//! - `EMAIL_CHANGE_TOKEN_TTL_SECS`: Lifetime of email-change tokens (default: 86400, 0 disables expiry)
//! - `RUST_LOG`: Log level
//!
//! # Example
//!
//! ```no_run
//! use linkup_api::config::Config;
//!
//! # fn example() -> anyhow::Result<()> {
//! let config = Config::from_env()?;
//! println!("Server will listen on {}", config.bind_address());
//! # Ok(())
//! # }
//! ```

use linkup_shared::{auth::password::PasswordScheme, models::user::UserId};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub api: ApiConfig,
    pub store: StoreConfig,
    pub jwt: JwtConfig,
    pub account: AccountConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Production mode
    ///
    /// Hides verification links from responses, disables the fixture session
    /// user and enables HSTS.
    pub production: bool,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Base URL of this server as seen by browsers
    pub public_base_url: String,
}

/// Record store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON document
    pub path: PathBuf,
}

/// JWT configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,
}

/// Account behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// How new credentials are stored
    pub password_scheme: PasswordScheme,

    /// User resolved as the caller when a request carries no token
    pub session_fixture_user: Option<UserId>,

    /// Lifetime of pending email-change tokens in seconds, None for no expiry
    pub email_change_token_ttl_secs: Option<u64>,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - Environment variables have invalid values
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "3001".to_string())
            .parse::<u16>()?;

        let production = env::var("API_PRODUCTION")
            .map(|value| parse_bool(&value))
            .unwrap_or(Ok(false))?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let store_path = env::var("STORE_PATH").unwrap_or_else(|_| "db.json".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let password_scheme = env::var("PASSWORD_SCHEME")
            .unwrap_or_else(|_| "plaintext".to_string())
            .parse::<PasswordScheme>()?;

        let session_fixture_user = match env::var("SESSION_FIXTURE_USER_ID") {
            Ok(value) if value.trim().is_empty() => None,
            Ok(value) => Some(value.parse::<UserId>().map_err(|e| {
                anyhow::anyhow!("SESSION_FIXTURE_USER_ID must be a numeric user id: {}", e)
            })?),
            Err(_) => Some(UserId::new(1)),
        };

        let email_change_token_ttl_secs = parse_token_ttl(
            &env::var("EMAIL_CHANGE_TOKEN_TTL_SECS").unwrap_or_else(|_| "86400".to_string()),
        )?;

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                production,
                cors_origins,
                public_base_url,
            },
            store: StoreConfig {
                path: PathBuf::from(store_path),
            },
            jwt: JwtConfig { secret: jwt_secret },
            account: AccountConfig {
                password_scheme,
                session_fixture_user,
                email_change_token_ttl_secs,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Fixture session user, never available in production
    pub fn effective_fixture_user(&self) -> Option<UserId> {
        if self.api.production {
            None
        } else {
            self.account.session_fixture_user
        }
    }

    /// Lifetime of email-change tokens
    ///
    /// `from_env` only accepts representable values; an out-of-range value
    /// set by hand is treated as no expiry.
    pub fn email_change_token_ttl(&self) -> Option<chrono::Duration> {
        self.account
            .email_change_token_ttl_secs
            .and_then(ttl_from_secs)
    }

    /// Builds the confirmation link for an email-change token
    pub fn verification_link(&self, token: &str) -> String {
        format!(
            "{}/users/confirm-email-change?token={}",
            self.api.public_base_url, token
        )
    }
}

fn ttl_from_secs(secs: u64) -> Option<chrono::Duration> {
    i64::try_from(secs).ok().and_then(chrono::Duration::try_seconds)
}

/// Parses a token lifetime in seconds; `0` disables expiry
fn parse_token_ttl(value: &str) -> anyhow::Result<Option<u64>> {
    let secs = value.trim().parse::<u64>()?;

    if secs == 0 {
        return Ok(None);
    }

    if ttl_from_secs(secs).is_none() {
        anyhow::bail!("EMAIL_CHANGE_TOKEN_TTL_SECS is out of range: {}", secs);
    }

    Ok(Some(secs))
}

fn parse_bool(value: &str) -> anyhow::Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => anyhow::bail!("Expected a boolean, got {:?}", other),
    }
}
