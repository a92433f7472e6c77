//! Account settings endpoints
//!
//! Credential changes for the current session user, plus the token
//! confirmation step of the email change flow.
//!
//! # Endpoints
//!
//! - `PATCH /user/update-password` - Change password (session required)
//! - `PATCH /users/request-email-update` - Start an email change (session required)
//! - `GET /users/confirm-email-change?token=` - Finish an email change

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::JsonBody,
    routes::auth::MessageResponse,
};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use linkup_shared::{
    auth::session::SessionContext,
    models::{email_change::PendingEmailChange, user::User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Update password request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdatePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 1, message = "New password is required"))]
    pub new_password: String,
}

/// Email change request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestEmailUpdateRequest {
    #[validate(length(min = 1, message = "New email is required"))]
    pub new_email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Email change response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestEmailUpdateResponse {
    pub message: String,

    /// Confirmation link, only outside production so suites can follow it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mock_verification_link: Option<String>,
}

/// Confirmation query string
#[derive(Debug, Default, Deserialize)]
pub struct ConfirmEmailChangeQuery {
    pub token: Option<String>,
}

/// Confirmation response
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfirmEmailChangeResponse {
    pub message: String,
    pub email: String,
}

/// Change the session user's password
///
/// # Endpoint
///
/// ```text
/// PATCH /user/update-password
/// Content-Type: application/json
///
/// { "currentPassword": "07032004", "newPassword": "05032004" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Field missing, or current password incorrect
/// - `401 Unauthorized`: No session
/// - `404 Not Found`: Session user no longer exists
pub async fn update_password(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    JsonBody(req): JsonBody<UpdatePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    let new_credential = state.password_scheme().encode(&req.new_password)?;

    User::change_password(
        &state.store,
        session.user_id,
        &req.current_password,
        new_credential,
    )
    .await?;

    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// Start changing the session user's email address
///
/// # Endpoint
///
/// ```text
/// PATCH /users/request-email-update
/// Content-Type: application/json
///
/// { "newEmail": "b@mailinator.com", "password": "07032004" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "message": "Verification email sent to b@mailinator.com",
///   "mockVerificationLink": "http://localhost:3001/users/confirm-email-change?token=..."
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Field missing, or password incorrect
/// - `401 Unauthorized`: No session
/// - `404 Not Found`: Session user no longer exists
/// - `409 Conflict`: Another user owns the new email
pub async fn request_email_update(
    State(state): State<AppState>,
    Extension(session): Extension<SessionContext>,
    JsonBody(req): JsonBody<RequestEmailUpdateRequest>,
) -> ApiResult<Json<RequestEmailUpdateResponse>> {
    req.validate()?;

    let pending =
        PendingEmailChange::request(&state.store, session.user_id, &req.new_email, &req.password)
            .await?;

    let mock_verification_link =
        (!state.config.api.production).then(|| state.config.verification_link(&pending.token));

    Ok(Json(RequestEmailUpdateResponse {
        message: format!("Verification email sent to {}", pending.new_email),
        mock_verification_link,
    }))
}

/// Confirm an email change with its verification token
///
/// The token is the only credential; no session is needed.
///
/// # Endpoint
///
/// ```text
/// GET /users/confirm-email-change?token=...
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Token missing, unknown, already used or expired
/// - `404 Not Found`: The requesting user no longer exists
/// - `409 Conflict`: Another user took the address since the request
pub async fn confirm_email_change(
    State(state): State<AppState>,
    Query(query): Query<ConfirmEmailChangeQuery>,
) -> ApiResult<Json<ConfirmEmailChangeResponse>> {
    let token = query
        .token
        .filter(|token| !token.trim().is_empty())
        .ok_or_else(|| ApiError::missing_field("token", "Token is required"))?;

    let user =
        PendingEmailChange::confirm(&state.store, &token, state.config.email_change_token_ttl())
            .await?;

    Ok(Json(ConfirmEmailChangeResponse {
        message: "Email updated successfully".to_string(),
        email: user.email,
    }))
}
