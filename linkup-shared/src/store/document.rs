//! In-memory representation of the JSON store document

use crate::models::{email_change::PendingEmailChange, user::{User, UserId}};
use super::json_file::StoreError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The complete store document
///
/// ```json
/// {
///   "users": [{ "id": 1, "email": "a@mailinator.com", "password": "..." }],
///   "pendingEmailChanges": [],
///   "nextUserId": 2,
///   "posts": []
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    /// Registered accounts
    #[serde(default)]
    pub users: Vec<User>,

    /// Email changes waiting for token confirmation
    #[serde(default)]
    pub pending_email_changes: Vec<PendingEmailChange>,

    /// Next identifier handed out by [`StoreDocument::allocate_user_id`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    next_user_id: Option<u64>,

    /// Collections this service does not interpret (feed, jobs, companies...)
    #[serde(flatten)]
    pub collections: Map<String, Value>,
}

impl StoreDocument {
    /// Allocates a fresh user identifier
    ///
    /// Identifiers come from a persisted counter, never from the collection
    /// size. The counter is raised to `max(id) + 1` first so records added to
    /// the file by hand cannot collide with generated ones.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::IdsExhausted`] once the counter would pass
    /// `u64::MAX`.
    pub fn allocate_user_id(&mut self) -> Result<UserId, StoreError> {
        let floor = match self.users.iter().map(|user| user.id.value()).max() {
            Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted)?,
            None => 1,
        };

        let next = self.next_user_id.map_or(floor, |counter| counter.max(floor));
        self.next_user_id = Some(next.checked_add(1).ok_or(StoreError::IdsExhausted)?);

        Ok(UserId::new(next))
    }

    pub fn user(&self, id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|user| user.id == id)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&User> {
        self.users.iter().find(|user| user.email == email)
    }

    /// Whether `email` belongs to any user other than `except`
    pub fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.users
            .iter()
            .any(|user| user.email == email && Some(user.id) != except)
    }

    pub fn pending_by_token(&self, token: &str) -> Option<&PendingEmailChange> {
        self.pending_email_changes
            .iter()
            .find(|pending| pending.token == token)
    }

    /// Removes and returns the pending change holding `token`
    pub fn take_pending(&mut self, token: &str) -> Option<PendingEmailChange> {
        let index = self
            .pending_email_changes
            .iter()
            .position(|pending| pending.token == token)?;

        Some(self.pending_email_changes.remove(index))
    }
}
