//! Roster projection over committed member statuses.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use imasu_core::result::AppResult;
use imasu_core::types::MemberId;
use imasu_database::PresenceStore;
use imasu_entity::member::Member;
use imasu_entity::presence::PresenceStatus;

/// One member as shown on the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: MemberId,
    /// Display name, or the email when no name is set.
    pub display_name: String,
    pub color_code: String,
    pub status: PresenceStatus,
}

impl From<Member> for RosterEntry {
    fn from(member: Member) -> Self {
        Self {
            id: member.id,
            display_name: member.label().to_string(),
            color_code: member.color_code,
            status: member.status,
        }
    }
}

/// Answers "who is here" from the statuses the state machine committed.
///
/// Nothing is cached; every query reads the store, so an accepted
/// transition is visible to the next roster read.
#[derive(Clone)]
pub struct RosterService {
    store: Arc<dyn PresenceStore>,
}

impl std::fmt::Debug for RosterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterService").finish_non_exhaustive()
    }
}

impl RosterService {
    pub fn new(store: Arc<dyn PresenceStore>) -> Self {
        Self { store }
    }

    /// Members whose current status is `in`.
    pub async fn currently_present(&self) -> AppResult<Vec<RosterEntry>> {
        self.by_status(PresenceStatus::In).await
    }

    /// Members whose current status is `status`, ordered by display name.
    pub async fn by_status(&self, status: PresenceStatus) -> AppResult<Vec<RosterEntry>> {
        let members = self.store.members_with_status(status).await?;
        Ok(members.into_iter().map(RosterEntry::from).collect())
    }
}
