//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use imasu_auth::jwt::IssuedToken;
use imasu_core::types::MemberId;
use imasu_entity::attendance::AttendanceEvent;
use imasu_entity::member::Member;
use imasu_entity::presence::{PresenceAction, PresenceStatus};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Issued access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for TokenResponse {
    fn from(token: IssuedToken) -> Self {
        Self {
            access_token: token.access_token,
            token_type: "bearer".to_string(),
            expires_at: token.expires_at,
        }
    }
}

/// A member's own profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberResponse {
    pub id: MemberId,
    pub email: String,
    pub display_name: Option<String>,
    pub original_id: Option<String>,
    pub color_code: String,
    pub status: PresenceStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Member> for MemberResponse {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            email: member.email,
            display_name: member.display_name,
            original_id: member.original_id,
            color_code: member.color_code,
            status: member.status,
            created_at: member.created_at,
            updated_at: member.updated_at,
        }
    }
}

/// Registration result: the new member plus their first token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub member: MemberResponse,
    pub token: TokenResponse,
}

/// One attendance log entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogResponse {
    pub id: i64,
    pub member_id: MemberId,
    pub action: PresenceAction,
    pub place: String,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<AttendanceEvent> for LogResponse {
    fn from(event: AttendanceEvent) -> Self {
        Self {
            id: event.id,
            member_id: event.member_id,
            action: event.action,
            place: event.place,
            note: event.note,
            created_at: event.created_at,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Which store backend is configured.
    pub store: String,
}
