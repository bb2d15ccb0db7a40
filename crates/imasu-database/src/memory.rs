//! In-memory presence store for tests and single-node deployments.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use imasu_core::error::AppError;
use imasu_core::result::AppResult;
use imasu_core::types::MemberId;
use imasu_entity::attendance::{AttendanceEvent, NewAttendanceEvent, TransitionCommit};
use imasu_entity::member::model::DEFAULT_COLOR_CODE;
use imasu_entity::member::{CreateMember, Member, UpdateMember};
use imasu_entity::presence::PresenceStatus;

/// A member together with their log, guarded as one unit.
#[derive(Debug)]
struct MemberRecord {
    member: Member,
    /// Oldest first.
    events: Vec<AttendanceEvent>,
}

/// Process-local [`PresenceStore`](crate::store::PresenceStore).
///
/// Each member lives in its own map entry; the entry's shard lock is held
/// for the whole of a transition so the status and the log change together.
/// Nothing locks the map as a whole.
#[derive(Debug)]
pub struct MemoryPresenceStore {
    members: DashMap<MemberId, MemberRecord>,
    /// Lowercased email → member.
    emails: DashMap<String, MemberId>,
    next_event_id: AtomicI64,
}

impl MemoryPresenceStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            members: DashMap::new(),
            emails: DashMap::new(),
            next_event_id: AtomicI64::new(1),
        }
    }

    fn not_found(id: MemberId) -> AppError {
        AppError::not_found(format!("Member {id} not found"))
    }
}

impl Default for MemoryPresenceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl crate::store::PresenceStore for MemoryPresenceStore {
    async fn create_member(&self, data: &CreateMember) -> AppResult<Member> {
        let id = MemberId::new();

        match self.emails.entry(data.email.to_lowercase()) {
            Entry::Occupied(_) => return Err(AppError::conflict("Email already in use")),
            Entry::Vacant(slot) => {
                slot.insert(id);
            }
        }

        let now = Utc::now();
        let member = Member {
            id,
            email: data.email.clone(),
            password_hash: data.password_hash.clone(),
            display_name: data.display_name.clone(),
            original_id: data.original_id.clone(),
            color_code: DEFAULT_COLOR_CODE.to_string(),
            status: PresenceStatus::INITIAL,
            created_at: now,
            updated_at: now,
        };

        self.members.insert(
            id,
            MemberRecord {
                member: member.clone(),
                events: Vec::new(),
            },
        );

        Ok(member)
    }

    async fn find_member(&self, id: MemberId) -> AppResult<Option<Member>> {
        Ok(self.members.get(&id).map(|r| r.member.clone()))
    }

    async fn find_member_by_email(&self, email: &str) -> AppResult<Option<Member>> {
        let Some(id) = self.emails.get(&email.to_lowercase()).map(|r| *r.value()) else {
            return Ok(None);
        };
        self.find_member(id).await
    }

    async fn update_profile(&self, data: &UpdateMember) -> AppResult<Member> {
        let mut record = self
            .members
            .get_mut(&data.id)
            .ok_or_else(|| Self::not_found(data.id))?;

        let member = &mut record.member;
        if let Some(display_name) = &data.display_name {
            member.display_name = Some(display_name.clone());
        }
        if let Some(color_code) = &data.color_code {
            member.color_code = color_code.clone();
        }
        if let Some(original_id) = &data.original_id {
            member.original_id = Some(original_id.clone());
        }
        member.updated_at = Utc::now();

        Ok(member.clone())
    }

    async fn members_with_status(&self, status: PresenceStatus) -> AppResult<Vec<Member>> {
        let mut members: Vec<Member> = self
            .members
            .iter()
            .filter(|r| r.member.status == status)
            .map(|r| r.member.clone())
            .collect();

        members.sort_by(|a, b| a.label().cmp(b.label()).then(a.id.cmp(&b.id)));
        Ok(members)
    }

    async fn current_status(&self, id: MemberId) -> AppResult<PresenceStatus> {
        self.members
            .get(&id)
            .map(|r| r.member.status)
            .ok_or_else(|| Self::not_found(id))
    }

    async fn append_transition(
        &self,
        expected: PresenceStatus,
        next: PresenceStatus,
        event: &NewAttendanceEvent,
    ) -> AppResult<TransitionCommit> {
        let mut record = self
            .members
            .get_mut(&event.member_id)
            .ok_or_else(|| Self::not_found(event.member_id))?;

        let actual = record.member.status;
        if actual != expected {
            debug!(member_id = %event.member_id, %expected, %actual, "Status moved before commit");
            return Ok(TransitionCommit::StatusChanged(actual));
        }

        // Keep (created_at, id) ordering equal to insertion order even if
        // the wall clock steps backwards.
        let now = Utc::now();
        let created_at = match record.events.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };

        let appended = AttendanceEvent {
            id: self.next_event_id.fetch_add(1, Ordering::SeqCst),
            member_id: event.member_id,
            action: event.action,
            place: event.place.clone(),
            note: event.note.clone(),
            created_at,
        };

        record.events.push(appended.clone());
        record.member.status = next;
        record.member.updated_at = created_at;

        Ok(TransitionCommit::Committed(appended))
    }

    async fn history(&self, id: MemberId) -> AppResult<Vec<AttendanceEvent>> {
        let record = self.members.get(&id).ok_or_else(|| Self::not_found(id))?;
        Ok(record.events.iter().rev().cloned().collect())
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(true)
    }
}
