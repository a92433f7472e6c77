//! Token-confirmed email address changes
//!
//! Changing an address is a two-step flow:
//!
//! ```text
//! [No pending change] --request(new_email, password)--> [Pending: token issued]
//! [Pending]           --confirm(token)-------------------> [No pending change; email updated]
//! [Pending]           --confirm(unknown token)-----------> [Pending unchanged; error]
//! [Pending]           --confirm(token past its TTL)-----> [No pending change; error]
//! ```
//!
//! A token is single-use: a successful confirmation removes the pending
//! record, so presenting the same token again fails with
//! [`AccountError::InvalidToken`].

use super::{
    user::{User, UserId},
    AccountError,
};
use crate::auth::{password::verify_credential, token::generate_verification_token};
use crate::store::{JsonStore, StoreError};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// A requested email change waiting for confirmation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingEmailChange {
    pub user_id: UserId,
    pub new_email: String,
    pub token: String,
    pub created_at: DateTime<Utc>,
}

enum Redemption {
    Applied(User),
    Expired,
}

impl PendingEmailChange {
    /// Whether this request is older than `ttl`
    ///
    /// `None` means pending changes never expire.
    pub fn is_expired(&self, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
        ttl.is_some_and(|ttl| now - self.created_at > ttl)
    }

    /// Records a request to move `user_id` to `new_email`
    ///
    /// # Errors
    ///
    /// - [`AccountError::UserNotFound`] if the user does not exist
    /// - [`AccountError::IncorrectPassword`] if `password` does not match
    /// - [`AccountError::EmailTaken`] if another user owns `new_email`
    pub async fn request(
        store: &JsonStore,
        user_id: UserId,
        new_email: &str,
        password: &str,
    ) -> Result<Self, AccountError> {
        let now = Utc::now();

        let pending = store
            .transaction(|doc| {
                let user = doc.user(user_id).ok_or(AccountError::UserNotFound(user_id))?;

                if !verify_credential(password, &user.password)? {
                    return Err(AccountError::IncorrectPassword);
                }

                if doc.email_taken(new_email, Some(user_id)) {
                    return Err(AccountError::EmailTaken);
                }

                let mut token = generate_verification_token();
                while doc.pending_by_token(&token).is_some() {
                    token = generate_verification_token();
                }

                let pending = PendingEmailChange {
                    user_id,
                    new_email: new_email.to_string(),
                    token,
                    created_at: now,
                };

                doc.pending_email_changes.push(pending.clone());
                Ok(pending)
            })
            .await?;

        tracing::info!(user_id = %user_id, "Email change requested");
        Ok(pending)
    }

    /// Redeems `token`, moving the user to the requested address
    ///
    /// An expired token is removed from the store before the error is
    /// reported. Every other failure leaves the pending record in place.
    ///
    /// # Errors
    ///
    /// - [`AccountError::InvalidToken`] if no pending change holds `token`
    /// - [`AccountError::TokenExpired`] if the change is older than `ttl`
    /// - [`AccountError::UserNotFound`] if the user was removed meanwhile
    /// - [`AccountError::EmailTaken`] if another user took the address meanwhile
    pub async fn confirm(
        store: &JsonStore,
        token: &str,
        ttl: Option<Duration>,
    ) -> Result<User, AccountError> {
        let now = Utc::now();

        let redemption = store
            .transaction(|doc| {
                let pending = doc
                    .pending_by_token(token)
                    .cloned()
                    .ok_or(AccountError::InvalidToken)?;

                if pending.is_expired(ttl, now) {
                    doc.take_pending(token);
                    return Ok(Redemption::Expired);
                }

                if doc.user(pending.user_id).is_none() {
                    return Err(AccountError::UserNotFound(pending.user_id));
                }

                if doc.email_taken(&pending.new_email, Some(pending.user_id)) {
                    return Err(AccountError::EmailTaken);
                }

                doc.take_pending(token);

                let user = doc
                    .user_mut(pending.user_id)
                    .ok_or(AccountError::UserNotFound(pending.user_id))?;
                user.email = pending.new_email;
                user.updated_at = Some(now);

                Ok(Redemption::Applied(user.clone()))
            })
            .await?;

        match redemption {
            Redemption::Applied(user) => {
                tracing::info!(user_id = %user.id, "Email change confirmed");
                Ok(user)
            }
            Redemption::Expired => {
                tracing::info!("Expired email change token presented");
                Err(AccountError::TokenExpired)
            }
        }
    }

    pub async fn find_by_token(store: &JsonStore, token: &str) -> Result<Option<Self>, StoreError> {
        store.read(|doc| doc.pending_by_token(token).cloned()).await
    }

    /// All unconfirmed changes requested by `user_id`, oldest first
    pub async fn pending_for_user(
        store: &JsonStore,
        user_id: UserId,
    ) -> Result<Vec<Self>, StoreError> {
        store
            .read(|doc| {
                doc.pending_email_changes
                    .iter()
                    .filter(|pending| pending.user_id == user_id)
                    .cloned()
                    .collect()
            })
            .await
    }
}
