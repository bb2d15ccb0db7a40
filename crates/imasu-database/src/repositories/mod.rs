//! PostgreSQL repository implementations.

pub mod attendance;
pub mod member;

pub use attendance::AttendanceRepository;
pub use member::MemberRepository;

use async_trait::async_trait;
use sqlx::PgPool;

use imasu_core::error::{AppError, ErrorKind};
use imasu_core::result::AppResult;
use imasu_core::types::MemberId;
use imasu_entity::attendance::{AttendanceEvent, NewAttendanceEvent, TransitionCommit};
use imasu_entity::member::{CreateMember, Member, UpdateMember};
use imasu_entity::presence::PresenceStatus;

use crate::store::PresenceStore;

/// [`PresenceStore`] backed by PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgPresenceStore {
    pool: PgPool,
    members: MemberRepository,
    attendance: AttendanceRepository,
}

impl PgPresenceStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            members: MemberRepository::new(pool.clone()),
            attendance: AttendanceRepository::new(pool.clone()),
            pool,
        }
    }
}

#[async_trait]
impl PresenceStore for PgPresenceStore {
    async fn create_member(&self, data: &CreateMember) -> AppResult<Member> {
        self.members.create(data).await
    }

    async fn find_member(&self, id: MemberId) -> AppResult<Option<Member>> {
        self.members.find_by_id(id).await
    }

    async fn find_member_by_email(&self, email: &str) -> AppResult<Option<Member>> {
        self.members.find_by_email(email).await
    }

    async fn update_profile(&self, data: &UpdateMember) -> AppResult<Member> {
        self.members.update_profile(data).await
    }

    async fn members_with_status(&self, status: PresenceStatus) -> AppResult<Vec<Member>> {
        self.members.find_by_status(status).await
    }

    async fn current_status(&self, id: MemberId) -> AppResult<PresenceStatus> {
        self.members
            .find_status(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Member {id} not found")))
    }

    async fn append_transition(
        &self,
        expected: PresenceStatus,
        next: PresenceStatus,
        event: &NewAttendanceEvent,
    ) -> AppResult<TransitionCommit> {
        self.attendance
            .append_transition(expected, next, event)
            .await
    }

    async fn history(&self, id: MemberId) -> AppResult<Vec<AttendanceEvent>> {
        if !self.members.exists(id).await? {
            return Err(AppError::not_found(format!("Member {id} not found")));
        }
        self.attendance.find_by_member(id).await
    }

    async fn health_check(&self) -> AppResult<bool> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|v| v == 1)
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Health check failed", e))
    }
}
