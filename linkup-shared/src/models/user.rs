//! User model and account operations
//!
//! # Record layout
//!
//! ```json
//! {
//!   "id": 1,
//!   "email": "a@mailinator.com",
//!   "password": "07032004",
//!   "firstName": "Ada",
//!   "lastName": "Lovelace",
//!   "createdAt": "2024-03-05T10:00:00Z",
//!   "updatedAt": "2024-03-05T10:00:00Z"
//! }
//! ```
//!
//! `password` holds whatever [`PasswordScheme::encode`](crate::auth::password::PasswordScheme::encode)
//! produced: the plaintext itself under the fixture scheme, an Argon2id PHC
//! string otherwise. Email comparison is exact and case-sensitive.

use super::AccountError;
use crate::auth::password::verify_credential;
use crate::store::{JsonStore, StoreError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Stable user identifier
///
/// Serialized as a JSON number. Numeric strings are accepted on input so
/// fixture files written by other tools load unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(UserId)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(value) => Ok(UserId(value)),
            RawId::Text(text) => text.parse().map_err(|_| {
                serde::de::Error::custom(format!("user id must be numeric, got {:?}", text))
            }),
        }
    }
}

/// User record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,

    /// Unique across all users
    pub email: String,

    /// Stored credential
    pub password: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,

    /// Profile fields owned by other tools (avatar, headline...), kept as-is
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Input for registering a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub email: String,

    /// Already-encoded credential
    pub password: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,
}

impl User {
    /// Creates a user
    ///
    /// The uniqueness check and the insert happen in the same transaction,
    /// so two concurrent registrations for one address cannot both succeed.
    ///
    /// # Errors
    ///
    /// - [`AccountError::EmailTaken`] if the email is already registered
    /// - [`AccountError::Store`] if the store cannot be persisted
    pub async fn create(store: &JsonStore, data: CreateUser) -> Result<Self, AccountError> {
        let now = Utc::now();

        let user = store
            .transaction(|doc| {
                if doc.email_taken(&data.email, None) {
                    return Err(AccountError::EmailTaken);
                }

                let user = User {
                    id: doc.allocate_user_id()?,
                    email: data.email,
                    password: data.password,
                    first_name: data.first_name.unwrap_or_default(),
                    last_name: data.last_name.unwrap_or_default(),
                    created_at: Some(now),
                    updated_at: Some(now),
                    extra: Map::new(),
                };

                doc.users.push(user.clone());
                Ok(user)
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    pub async fn find_by_id(store: &JsonStore, id: UserId) -> Result<Option<Self>, StoreError> {
        store.read(|doc| doc.user(id).cloned()).await
    }

    /// Finds a user by exact email
    pub async fn find_by_email(store: &JsonStore, email: &str) -> Result<Option<Self>, StoreError> {
        store.read(|doc| doc.user_by_email(email).cloned()).await
    }

    /// Whether any user has this exact email
    pub async fn email_exists(store: &JsonStore, email: &str) -> Result<bool, StoreError> {
        store.read(|doc| doc.email_taken(email, None)).await
    }

    /// Returns the user whose email and credential both match
    ///
    /// A wrong password and an unknown email are indistinguishable to the
    /// caller.
    pub async fn authenticate(
        store: &JsonStore,
        email: &str,
        password: &str,
    ) -> Result<Option<Self>, AccountError> {
        let Some(user) = Self::find_by_email(store, email).await? else {
            return Ok(None);
        };

        if verify_credential(password, &user.password)? {
            Ok(Some(user))
        } else {
            Ok(None)
        }
    }

    /// Replaces the credential after checking the current password
    ///
    /// `new_credential` must already be encoded by the active password scheme.
    ///
    /// # Errors
    ///
    /// - [`AccountError::UserNotFound`] if `id` does not exist
    /// - [`AccountError::IncorrectPassword`] if `current_password` does not match
    pub async fn change_password(
        store: &JsonStore,
        id: UserId,
        current_password: &str,
        new_credential: String,
    ) -> Result<Self, AccountError> {
        let now = Utc::now();

        let user = store
            .transaction(|doc| {
                let user = doc.user_mut(id).ok_or(AccountError::UserNotFound(id))?;

                if !verify_credential(current_password, &user.password)? {
                    return Err(AccountError::IncorrectPassword);
                }

                user.password = new_credential;
                user.updated_at = Some(now);
                Ok(user.clone())
            })
            .await?;

        tracing::info!(user_id = %id, "Password changed");
        Ok(user)
    }

    pub async fn count(store: &JsonStore) -> Result<usize, StoreError> {
        store.read(|doc| doc.users.len()).await
    }
}
