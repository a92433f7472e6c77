//! Health check endpoint
//!
//! Reports whether the record store is readable.
//!
//! # Endpoint
//!
//! ```text
//! GET /health
//! ```
//!
//! # Response
//!
//! ```json
//! {
//!   "status": "healthy",
//!   "version": "0.1.0",
//!   "store": "ok",
//!   "users": 3
//! }
//! ```

use crate::app::AppState;
use axum::{extract::State, Json};
use linkup_shared::models::user::User;
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Application version
    pub version: String,

    /// Store status
    pub store: String,

    /// Number of user records, when the store is readable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<usize>,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, store, users) = match User::count(&state.store).await {
        Ok(count) => ("healthy", "ok".to_string(), Some(count)),
        Err(err) => {
            tracing::warn!(error = %err, "Store unavailable during health check");
            ("degraded", "unavailable".to_string(), None)
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store,
        users,
    })
}
