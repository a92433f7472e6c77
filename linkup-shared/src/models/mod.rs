//! Identity data model and account operations
//!
//! Models own their operations against the [`JsonStore`](crate::store::JsonStore).
//! Every operation that checks an invariant and then mutates state does both
//! inside one store transaction.
//!
//! # Models
//!
//! - `user`: User accounts, registration, login and password changes
//! - `email_change`: Token-confirmed email address changes
//!
//! # Example
//!
//! ```
//! use linkup_shared::auth::password::PasswordScheme;
//! use linkup_shared::models::user::{CreateUser, User};
//! use linkup_shared::store::JsonStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = JsonStore::in_memory();
//! let scheme = PasswordScheme::Plaintext;
//!
//! let user = User::create(
//!     &store,
//!     CreateUser {
//!         email: "a@mailinator.com".to_string(),
//!         password: scheme.encode("07032004")?,
//!         first_name: None,
//!         last_name: None,
//!     },
//! )
//! .await?;
//!
//! assert!(User::authenticate(&store, "a@mailinator.com", "07032004").await?.is_some());
//! # Ok(())
//! # }
//! ```

pub mod email_change;
pub mod user;

use crate::auth::password::PasswordError;
use crate::store::StoreError;
use user::UserId;

/// Error type for account operations
#[derive(Debug, thiserror::Error)]
pub enum AccountError {
    /// Another account already uses the email address
    #[error("Email address is already registered")]
    EmailTaken,

    /// The referenced user record does not exist
    #[error("User {0} not found")]
    UserNotFound(UserId),

    /// The presented current password does not match
    #[error("Current password is incorrect")]
    IncorrectPassword,

    /// No pending email change holds this token
    #[error("Verification token is invalid")]
    InvalidToken,

    /// The pending email change outlived its time-to-live
    #[error("Verification token has expired")]
    TokenExpired,

    /// Store access failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Credential hashing or verification failed
    #[error(transparent)]
    Password(#[from] PasswordError),
}
