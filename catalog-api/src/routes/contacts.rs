/// Contacts endpoints
///
/// The contact identity shown on this page comes from configuration
/// (`CONTACT_USER_ID`), replacing the hard-coded user id the original
/// system shipped with. Posted messages are logged; there is no mailbox.
///
/// # Endpoints
///
/// - `GET  /contacts` - the configured contact's username and email
/// - `POST /contacts` - submit a contact message

use crate::{
    app::AppState,
    error::{collect_validation_errors, ApiError, ApiResult},
};
use axum::{extract::State, Json};
use catalog_shared::models::user::User;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Contact information response
#[derive(Debug, Serialize)]
pub struct ContactResponse {
    /// Contact's login name
    pub username: String,

    /// Contact's email address
    pub email: String,
}

/// A posted contact message
#[derive(Debug, Deserialize, Validate)]
pub struct ContactMessage {
    /// Sender name
    #[validate(length(min = 1, max = 150, message = "Name is required"))]
    pub name: String,

    /// Sender email
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Message body
    #[validate(length(min = 1, max = 5000, message = "Message is required"))]
    pub message: String,
}

/// Acknowledgment for a posted message
#[derive(Debug, Serialize)]
pub struct ContactAck {
    /// Outcome marker
    pub status: String,
}

/// Returns the configured contact identity; 404 when unset or missing
pub async fn contact_info(State(state): State<AppState>) -> ApiResult<Json<ContactResponse>> {
    let user_id = state
        .config
        .contact
        .user_id
        .ok_or_else(|| ApiError::NotFound("No contact user configured".to_string()))?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Contact user not found".to_string()))?;

    Ok(Json(ContactResponse {
        username: user.username,
        email: user.email,
    }))
}

/// Accepts a contact message and logs it
pub async fn submit_contact(Json(message): Json<ContactMessage>) -> ApiResult<Json<ContactAck>> {
    message
        .validate()
        .map_err(|e| ApiError::ValidationError(collect_validation_errors(&e, "")))?;

    tracing::info!(
        name = %message.name,
        email = %message.email,
        message = %message.message,
        "Contact message received"
    );

    Ok(Json(ContactAck {
        status: "received".to_string(),
    }))
}
