//! Session middleware
//!
//! Resolves the caller's identity once per request and stores the resulting
//! [`SessionContext`] in the request extensions, where account handlers pick
//! it up with `Extension<SessionContext>`.

use crate::{app::AppState, error::ApiError};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use linkup_shared::auth::session::SessionSource;

/// Rejects the request with 401 when no session can be resolved
pub async fn session_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .map_err(|_| ApiError::Unauthorized("Malformed authorization header".to_string()))
        })
        .transpose()?;

    let session = state.sessions.resolve(authorization)?;

    if session.source == SessionSource::Fixture {
        tracing::debug!(user_id = %session.user_id, "Request acting as fixture user");
    }

    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}
