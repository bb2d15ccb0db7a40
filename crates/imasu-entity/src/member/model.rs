//! Member entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use imasu_core::types::MemberId;

use crate::presence::PresenceStatus;

/// Default display colour for new members.
pub const DEFAULT_COLOR_CODE: &str = "#3b82f6";

/// A registered member of the room.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Member {
    /// Unique member identifier.
    pub id: MemberId,
    /// Account identifier used to log in.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Human-readable display name.
    pub display_name: Option<String>,
    /// Student or employee number.
    pub original_id: Option<String>,
    /// Display colour, passed through untouched.
    pub color_code: String,
    /// Current presence status, the result of the latest accepted event.
    pub status: PresenceStatus,
    /// When the member registered.
    pub created_at: DateTime<Utc>,
    /// When the profile or status last changed.
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Name to show for this member, falling back to the email address.
    pub fn label(&self) -> &str {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.email,
        }
    }

    /// Whether the member is currently in the room.
    pub fn is_present(&self) -> bool {
        self.status == PresenceStatus::In
    }
}

/// Data required to register a new member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMember {
    /// Account email, already normalized.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Display name (optional).
    pub display_name: Option<String>,
    /// Student or employee number (optional).
    pub original_id: Option<String>,
}

/// Profile fields a member may change about themselves.
///
/// Status and identity are deliberately absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMember {
    /// The member to update.
    pub id: MemberId,
    /// New display name.
    pub display_name: Option<String>,
    /// New colour code.
    pub color_code: Option<String>,
    /// New student or employee number.
    pub original_id: Option<String>,
}
