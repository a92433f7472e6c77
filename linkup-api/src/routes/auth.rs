//! Authentication endpoints
//!
//! Public endpoints used by the sign-up, sign-in and recovery screens.
//!
//! # Endpoints
//!
//! - `POST /auth/check-email` - Check whether an email can be registered
//! - `POST /auth/register` - Register new user
//! - `POST /auth/login` - Login and get tokens
//! - `POST /auth/refresh` - Exchange a refresh token for an access token
//! - `POST /auth/forgot-password` - Request a password reset link

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::JsonBody,
};
use axum::{extract::State, http::StatusCode, Json};
use linkup_shared::{
    auth::jwt::{self, Claims, TokenType},
    models::user::{CreateUser, User},
};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Message returned by forgot-password, whatever the outcome
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If this email exists, a password reset link has been sent.";

/// Check email request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct CheckEmailRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
}

/// Check email response
#[derive(Debug, Serialize, Deserialize)]
pub struct CheckEmailResponse {
    pub available: bool,
    pub message: String,
}

/// Register request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    pub first_name: Option<String>,

    pub last_name: Option<String>,
}

/// Login request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Access token (24h)
    pub token: String,

    /// Refresh token (30d)
    pub refresh_token: String,
}

/// Refresh token request
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Refresh token response
#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    /// New access token (24h)
    pub token: String,
}

/// Forgot password request
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

/// Generic message response
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Check email availability
///
/// # Endpoint
///
/// ```text
/// POST /auth/check-email
/// Content-Type: application/json
///
/// { "email": "a@mailinator.com" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Email missing
/// - `409 Conflict`: Email already registered
pub async fn check_email(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<CheckEmailRequest>,
) -> ApiResult<Json<CheckEmailResponse>> {
    req.validate()?;

    if User::email_exists(&state.store, &req.email).await? {
        return Err(ApiError::Conflict(
            "Email address is already registered".to_string(),
        ));
    }

    Ok(Json(CheckEmailResponse {
        available: true,
        message: "Email is available".to_string(),
    }))
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /auth/register
/// Content-Type: application/json
///
/// {
///   "email": "a@mailinator.com",
///   "password": "07032004",
///   "firstName": "Ada",
///   "lastName": "Lovelace"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with an empty body.
///
/// # Errors
///
/// - `400 Bad Request`: Email or password missing
/// - `409 Conflict`: Email already exists
pub async fn register(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> ApiResult<StatusCode> {
    req.validate()?;

    let password = state.password_scheme().encode(&req.password)?;

    User::create(
        &state.store,
        CreateUser {
            email: req.email,
            password,
            first_name: req.first_name,
            last_name: req.last_name,
        },
    )
    .await?;

    Ok(StatusCode::CREATED)
}

/// Login endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "email": "a@mailinator.com", "password": "07032004" }
/// ```
///
/// # Response
///
/// ```json
/// { "token": "eyJ...", "refreshToken": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: No user with this exact email and password
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = User::authenticate(&state.store, &req.email, &req.password)
        .await?
        .ok_or_else(|| {
            tracing::info!("Login rejected");
            ApiError::Unauthorized("Invalid email or password".to_string())
        })?;

    let (token, refresh_token) = jwt::issue_token_pair(user.id, state.jwt_secret())?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(LoginResponse {
        token,
        refresh_token,
    }))
}

/// Token refresh endpoint
///
/// # Endpoint
///
/// ```text
/// POST /auth/refresh
/// Content-Type: application/json
///
/// { "refreshToken": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid or expired refresh token, or the user no longer exists
pub async fn refresh(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<RefreshRequest>,
) -> ApiResult<Json<RefreshResponse>> {
    let claims = jwt::validate_refresh_token(&req.refresh_token, state.jwt_secret())?;
    let user_id = claims.user_id()?;

    if User::find_by_id(&state.store, user_id).await?.is_none() {
        return Err(ApiError::Unauthorized("Unknown user".to_string()));
    }

    let token = jwt::create_token(&Claims::new(user_id, TokenType::Access), state.jwt_secret())?;

    Ok(Json(RefreshResponse { token }))
}

/// Forgot password endpoint
///
/// Always answers `200 OK` with the same message so callers cannot learn
/// which addresses are registered. Even a missing or malformed body gets the
/// generic answer.
///
/// # Endpoint
///
/// ```text
/// POST /auth/forgot-password
/// Content-Type: application/json
///
/// { "email": "a@mailinator.com" }
/// ```
pub async fn forgot_password(
    State(state): State<AppState>,
    body: Option<JsonBody<ForgotPasswordRequest>>,
) -> Json<MessageResponse> {
    if let Some(JsonBody(req)) = body {
        match User::find_by_email(&state.store, &req.email).await {
            Ok(Some(user)) => {
                tracing::info!(user_id = %user.id, "Password reset requested");
            }
            Ok(None) => {
                tracing::debug!("Password reset requested for unknown email");
            }
            Err(err) => {
                tracing::warn!(error = %err, "Password reset lookup failed");
            }
        }
    }

    Json(MessageResponse::new(FORGOT_PASSWORD_MESSAGE))
}
