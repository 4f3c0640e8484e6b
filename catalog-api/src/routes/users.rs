/// User account endpoints
///
/// Login, logout, registration, profile update, and password reset.
///
/// # Endpoints
///
/// - `POST /users` - login, returns an access token
/// - `GET  /users/logout` - acknowledge logout (tokens are stateless)
/// - `POST /users/register` - create an account, returns an access token
/// - `GET  /users/update` - current profile (requires auth)
/// - `POST /users/update` - update username/email (requires auth)
/// - `POST /users/reset` - issue a new random password for an email
///
/// The reset flow preserves the original system's behavior: the server
/// generates a password, stores it immediately, and hands it back together
/// with a reset token. Email delivery is out of scope, so the response body
/// stands in for the email.

use crate::{
    app::AppState,
    error::{collect_validation_errors, ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use catalog_shared::{
    auth::{jwt, middleware::AuthContext, password},
    models::user::{CreateUser, UpdateUser, User},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Login name
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// User id
    pub user_id: i64,

    /// Access token (24h)
    pub access_token: String,
}

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Login name
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,

    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (also checked for strength)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// User id
    pub user_id: i64,

    /// Access token (24h)
    pub access_token: String,
}

/// Profile response
#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    /// User id
    pub user_id: i64,

    /// Login name
    pub username: String,

    /// Email address
    pub email: String,
}

/// Profile update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    /// New login name
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: Option<String>,

    /// New email address
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate)]
pub struct ResetRequest {
    /// Email of the account to reset
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset response
///
/// Stands in for the email the original system sent: the newly issued
/// password plus a reset token.
#[derive(Debug, Serialize)]
pub struct ResetResponse {
    /// Outcome marker
    pub status: String,

    /// The server-issued password, already in effect
    pub new_password: String,

    /// Reset token accompanying the new password
    pub reset_token: String,
}

/// Logout response
#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    /// Outcome marker
    pub status: String,
}

fn validate_request<T: Validate>(req: &T) -> ApiResult<()> {
    req.validate()
        .map_err(|e| ApiError::ValidationError(collect_validation_errors(&e, "")))
}

/// Login
///
/// Verifies the password against the stored argon2 hash and returns an
/// access token. The failure message never reveals which half was wrong.
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    validate_request(&req)?;

    let user = User::find_by_username(&state.db, &req.username)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid username or password".to_string()))?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    User::update_last_login(&state.db, user.id).await?;

    let access_token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;

    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        user_id: user.id,
        access_token,
    }))
}

/// Logout
///
/// Tokens are stateless, so there is nothing to invalidate server-side;
/// the client discards its token.
pub async fn logout() -> Json<LogoutResponse> {
    Json(LogoutResponse {
        status: "logged_out".to_string(),
    })
}

/// Registration
///
/// # Errors
///
/// - `422`: validation failed
/// - `409`: username or email already taken
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<RegisterResponse>> {
    validate_request(&req)?;

    password::validate_password_strength(&req.password).map_err(|message| {
        ApiError::ValidationError(vec![crate::error::ValidationErrorDetail {
            field: "password".to_string(),
            message,
        }])
    })?;

    let password_hash = password::hash_password(&req.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            username: req.username,
            email: req.email,
            password_hash,
        },
    )
    .await?;

    let access_token = jwt::create_token(&jwt::Claims::new(user.id), state.jwt_secret())?;

    tracing::info!(user_id = user.id, "User registered");

    Ok(Json(RegisterResponse {
        user_id: user.id,
        access_token,
    }))
}

/// Current profile (requires auth)
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(ProfileResponse {
        user_id: user.id,
        username: user.username,
        email: user.email,
    }))
}

/// Profile update (requires auth)
///
/// Only the submitted fields change.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<ProfileResponse>> {
    validate_request(&req)?;

    let user = User::update(
        &state.db,
        auth.user_id,
        UpdateUser {
            username: req.username,
            email: req.email,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(ProfileResponse {
        user_id: user.id,
        username: user.username,
        email: user.email,
    }))
}

/// Password reset
///
/// Issues a random password, stores its hash immediately, and returns it
/// with a reset token. 404 when no account matches the email.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> ApiResult<Json<ResetResponse>> {
    validate_request(&req)?;

    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::NotFound("No account with that email".to_string()))?;

    let new_password = password::generate_password();
    let password_hash = password::hash_password(&new_password)?;

    User::set_password(&state.db, user.id, &password_hash).await?;

    let reset_token = Uuid::new_v4().to_string();

    tracing::info!(user_id = user.id, "Password reset issued");

    Ok(Json(ResetResponse {
        status: "password_reset".to_string(),
        new_password,
        reset_token,
    }))
}
