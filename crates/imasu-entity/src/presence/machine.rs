//! The presence transition table.
//!
//! | current | action  | next |
//! |---------|---------|------|
//! | out     | enter   | in   |
//! | in      | exit    | out  |
//! | in      | go_out  | away |
//! | away    | return  | in   |
//!
//! Every other pair is rejected. Nothing here touches storage.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use imasu_core::error::{AppError, ErrorKind};

use super::{PresenceAction, PresenceStatus};

/// An action that is not legal from the member's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("cannot {action} while {current_status}")]
pub struct TransitionRejected {
    /// Status the member was in when the action was attempted.
    pub current_status: PresenceStatus,
    /// The rejected action.
    pub action: PresenceAction,
}

impl From<TransitionRejected> for AppError {
    fn from(rejected: TransitionRejected) -> Self {
        AppError::new(ErrorKind::InvalidTransition, rejected.to_string()).with_details(
            serde_json::json!({
                "current_status": rejected.current_status,
                "action": rejected.action,
            }),
        )
    }
}

impl PresenceStatus {
    /// Look up the status that `action` leads to from `self`.
    pub fn next(self, action: PresenceAction) -> Option<PresenceStatus> {
        use PresenceAction::*;
        use PresenceStatus::*;

        match (self, action) {
            (Out, Enter) => Some(In),
            (In, Exit) => Some(Out),
            (In, GoOut) => Some(Away),
            (Away, Return) => Some(In),
            _ => None,
        }
    }

    /// Apply `action`, rejecting pairs missing from the table.
    pub fn apply(self, action: PresenceAction) -> Result<PresenceStatus, TransitionRejected> {
        self.next(action).ok_or(TransitionRejected {
            current_status: self,
            action,
        })
    }

    /// Actions that are legal from this status.
    pub fn allowed_actions(self) -> Vec<PresenceAction> {
        PresenceAction::ALL
            .into_iter()
            .filter(|action| self.next(*action).is_some())
            .collect()
    }
}

/// A recorded history that the transition table does not accept.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event #{index} is illegal: {rejected}")]
pub struct ReplayError {
    /// Zero-based position of the offending action, oldest first.
    pub index: usize,
    /// The rejection at that position.
    pub rejected: TransitionRejected,
}

/// Fold a chronological (oldest first) sequence of actions from the initial
/// status and return the resulting status.
pub fn replay<I>(actions: I) -> Result<PresenceStatus, ReplayError>
where
    I: IntoIterator<Item = PresenceAction>,
{
    actions
        .into_iter()
        .enumerate()
        .try_fold(PresenceStatus::INITIAL, |status, (index, action)| {
            status
                .apply(action)
                .map_err(|rejected| ReplayError { index, rejected })
        })
}
