//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use imasu_entity::presence::PresenceAction;

/// Account creation body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateAccountRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
    #[validate(length(max = 64))]
    pub original_id: Option<String>,
}

/// OAuth2 password-grant style form for `POST /api/token`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TokenRequest {
    /// The account email.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Profile update body. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
    #[validate(length(max = 32))]
    pub color_code: Option<String>,
    #[validate(length(max = 64))]
    pub original_id: Option<String>,
}

/// A presence action. Place and note limits come from configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLogRequest {
    pub action: PresenceAction,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// `GET /api/users` query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterQuery {
    /// `in`, `out`, or `away`; defaults to `in`.
    pub status: Option<String>,
}
