//! The presence store abstraction and backend selection.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use imasu_core::config::{DatabaseConfig, StoreBackend};
use imasu_core::result::AppResult;
use imasu_core::types::MemberId;
use imasu_entity::attendance::{AttendanceEvent, NewAttendanceEvent, TransitionCommit};
use imasu_entity::member::{CreateMember, Member, UpdateMember};
use imasu_entity::presence::PresenceStatus;

use crate::connection::DatabasePool;
use crate::memory::MemoryPresenceStore;
use crate::migration::run_migrations;
use crate::repositories::PgPresenceStore;

/// Members, their current status, and their append-only attendance log.
///
/// Implementations must guarantee that [`append_transition`] is atomic:
/// the event is appended and the status updated together, or neither
/// happens. Reads of a single member's status are always a consistent
/// snapshot; no operation locks across members.
///
/// [`append_transition`]: PresenceStore::append_transition
#[async_trait]
pub trait PresenceStore: Send + Sync + 'static {
    /// Register a member with status `out`. Fails with `Conflict` if the
    /// email is taken.
    async fn create_member(&self, data: &CreateMember) -> AppResult<Member>;

    /// Find a member by id.
    async fn find_member(&self, id: MemberId) -> AppResult<Option<Member>>;

    /// Find a member by (normalized) email.
    async fn find_member_by_email(&self, email: &str) -> AppResult<Option<Member>>;

    /// Update profile fields. `None` fields are left unchanged.
    async fn update_profile(&self, data: &UpdateMember) -> AppResult<Member>;

    /// Every member whose committed status equals `status`.
    async fn members_with_status(&self, status: PresenceStatus) -> AppResult<Vec<Member>>;

    /// Current status of a member. Fails with `NotFound` for unknown ids.
    async fn current_status(&self, id: MemberId) -> AppResult<PresenceStatus>;

    /// Append `event` and set the member's status to `next`, provided the
    /// status is still `expected`.
    ///
    /// Returns [`TransitionCommit::StatusChanged`] without writing anything
    /// if the status moved underneath the caller.
    async fn append_transition(
        &self,
        expected: PresenceStatus,
        next: PresenceStatus,
        event: &NewAttendanceEvent,
    ) -> AppResult<TransitionCommit>;

    /// All events for a member, newest first. Fails with `NotFound` for
    /// unknown ids; a member without events yields an empty vector.
    async fn history(&self, id: MemberId) -> AppResult<Vec<AttendanceEvent>>;

    /// Check that the backend is reachable.
    async fn health_check(&self) -> AppResult<bool>;
}

/// Build the store selected by `config.backend`.
///
/// The PostgreSQL backend connects and runs pending migrations first.
pub async fn open_store(config: &DatabaseConfig) -> AppResult<Arc<dyn PresenceStore>> {
    info!(backend = %config.backend, "Opening presence store");

    match config.backend {
        StoreBackend::Postgres => {
            let pool = DatabasePool::connect(config).await?;
            run_migrations(pool.pool()).await?;
            Ok(Arc::new(PgPresenceStore::new(pool.into_pool())))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryPresenceStore::new())),
    }
}
