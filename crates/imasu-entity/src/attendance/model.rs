//! Attendance event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use imasu_core::types::MemberId;

use crate::presence::{PresenceAction, PresenceStatus};

/// An immutable record of one accepted presence action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AttendanceEvent {
    /// Monotonically increasing event identifier; also breaks timestamp ties.
    pub id: i64,
    /// The member the event belongs to.
    pub member_id: MemberId,
    /// The accepted action.
    pub action: PresenceAction,
    /// Location tag.
    pub place: String,
    /// Free-text annotation.
    pub note: Option<String>,
    /// Server time at which the event was committed.
    pub created_at: DateTime<Utc>,
}

/// An event waiting to be committed together with its status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAttendanceEvent {
    /// The member the event belongs to.
    pub member_id: MemberId,
    /// The action being recorded.
    pub action: PresenceAction,
    /// Location tag, already defaulted and trimmed.
    pub place: String,
    /// Free-text annotation.
    pub note: Option<String>,
}

/// Outcome of an atomic append-with-status-change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionCommit {
    /// The event was appended and the status updated together.
    Committed(AttendanceEvent),
    /// The member's status was no longer the expected one; nothing was written.
    StatusChanged(PresenceStatus),
}
