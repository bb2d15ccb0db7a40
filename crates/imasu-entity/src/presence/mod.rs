//! Presence statuses, member actions, and the transition table.

pub mod machine;

pub use machine::{ReplayError, TransitionRejected, replay};

use serde::{Deserialize, Serialize};

/// Where a member currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "presence_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// In the room.
    In,
    /// Gone home.
    Out,
    /// Stepped out, expected back.
    Away,
}

impl PresenceStatus {
    /// Status of a freshly registered member.
    pub const INITIAL: Self = Self::Out;

    /// All statuses, for iteration in tests and filters.
    pub const ALL: [Self; 3] = [Self::In, Self::Out, Self::Away];

    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Away => "away",
        }
    }
}

impl Default for PresenceStatus {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl std::fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresenceStatus {
    type Err = imasu_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            "away" => Ok(Self::Away),
            _ => Err(imasu_core::AppError::validation(format!(
                "Invalid presence status: '{s}'. Expected one of: in, out, away"
            ))),
        }
    }
}

/// A member-initiated request to change status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "presence_action", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PresenceAction {
    /// Arrive in the room.
    Enter,
    /// Leave for the day.
    Exit,
    /// Step out temporarily.
    GoOut,
    /// Come back after stepping out.
    Return,
}

impl PresenceAction {
    /// All actions, for iteration in tests.
    pub const ALL: [Self; 4] = [Self::Enter, Self::Exit, Self::GoOut, Self::Return];

    /// Return the action as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Enter => "enter",
            Self::Exit => "exit",
            Self::GoOut => "go_out",
            Self::Return => "return",
        }
    }
}

impl std::fmt::Display for PresenceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PresenceAction {
    type Err = imasu_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "enter" => Ok(Self::Enter),
            "exit" => Ok(Self::Exit),
            "go_out" => Ok(Self::GoOut),
            "return" => Ok(Self::Return),
            _ => Err(imasu_core::AppError::validation(format!(
                "Invalid action: '{s}'. Expected one of: enter, exit, go_out, return"
            ))),
        }
    }
}
