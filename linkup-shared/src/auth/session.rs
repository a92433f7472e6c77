//! Resolution of "the current user"
//!
//! Operations such as changing a password act on the caller's own account.
//! A [`SessionResolver`] turns the request's `Authorization` header into a
//! [`SessionContext`] that the HTTP layer injects into those handlers.
//!
//! # Resolution order
//!
//! 1. `Authorization: Bearer <access token>`: the token is validated and its
//!    subject becomes the session user.
//! 2. No header, fixture user configured: the fixture user is the session
//!    user. This is what lets browser suites that never log in drive the
//!    account screens against a seeded store.
//! 3. Otherwise the request is rejected.
//!
//! A header that is present but invalid is always rejected; it never falls
//! back to the fixture user.
//!
//! # Example
//!
//! ```
//! use linkup_shared::auth::session::{SessionResolver, SessionSource};
//! use linkup_shared::models::user::UserId;
//!
//! let resolver = SessionResolver::new("test-secret-key-at-least-32-bytes-long", Some(UserId::new(1)));
//! let session = resolver.resolve(None).unwrap();
//! assert_eq!(session.user_id, UserId::new(1));
//! assert_eq!(session.source, SessionSource::Fixture);
//! ```

use super::jwt::{validate_access_token, JwtError};
use crate::models::user::UserId;
use serde::{Deserialize, Serialize};

/// Where the session identity came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionSource {
    /// A validated access token
    Token,

    /// The configured fixture user
    Fixture,
}

/// Identity of the caller, resolved once per request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    pub user_id: UserId,
    pub source: SessionSource,
}

/// Error type for session resolution
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No credentials and no fixture user
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header is not a Bearer token
    #[error("Expected Bearer token")]
    InvalidFormat,

    /// Token validation failed
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),
}

/// Resolves request credentials into a [`SessionContext`]
#[derive(Debug, Clone)]
pub struct SessionResolver {
    secret: String,
    fixture_user: Option<UserId>,
}

impl SessionResolver {
    pub fn new(secret: impl Into<String>, fixture_user: Option<UserId>) -> Self {
        Self {
            secret: secret.into(),
            fixture_user,
        }
    }

    pub fn fixture_user(&self) -> Option<UserId> {
        self.fixture_user
    }

    /// Resolves the session from the raw `Authorization` header value
    pub fn resolve(&self, authorization: Option<&str>) -> Result<SessionContext, SessionError> {
        match authorization {
            Some(header) => {
                let token = header
                    .strip_prefix("Bearer ")
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .ok_or(SessionError::InvalidFormat)?;

                let claims = validate_access_token(token, &self.secret)?;

                Ok(SessionContext {
                    user_id: claims.user_id()?,
                    source: SessionSource::Token,
                })
            }
            None => self
                .fixture_user
                .map(|user_id| SessionContext {
                    user_id,
                    source: SessionSource::Fixture,
                })
                .ok_or(SessionError::MissingCredentials),
        }
    }
}
