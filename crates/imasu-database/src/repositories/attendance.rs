//! Attendance event repository implementation.

use sqlx::PgPool;
use tracing::debug;

use imasu_core::error::{AppError, ErrorKind};
use imasu_core::result::AppResult;
use imasu_core::types::MemberId;
use imasu_entity::attendance::{AttendanceEvent, NewAttendanceEvent, TransitionCommit};
use imasu_entity::presence::PresenceStatus;

/// Repository for the append-only `attendance_events` table.
#[derive(Debug, Clone)]
pub struct AttendanceRepository {
    pool: PgPool,
}

impl AttendanceRepository {
    /// Create a new attendance repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All events for a member, newest first.
    pub async fn find_by_member(&self, member_id: MemberId) -> AppResult<Vec<AttendanceEvent>> {
        sqlx::query_as::<_, AttendanceEvent>(
            "SELECT * FROM attendance_events WHERE member_id = $1 \
             ORDER BY created_at DESC, id DESC",
        )
        .bind(member_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to load history", e))
    }

    /// Move the member from `expected` to `next` and append `event`, in one
    /// transaction.
    ///
    /// The status update runs first so that it takes the member's row lock;
    /// the event's id and `clock_timestamp()` are therefore drawn after any
    /// competing transition for the same member has committed.
    pub async fn append_transition(
        &self,
        expected: PresenceStatus,
        next: PresenceStatus,
        event: &NewAttendanceEvent,
    ) -> AppResult<TransitionCommit> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to begin transaction", e)
        })?;

        let updated = sqlx::query(
            "UPDATE members SET status = $3, updated_at = NOW() \
             WHERE id = $1 AND status = $2",
        )
        .bind(event.member_id)
        .bind(expected)
        .bind(next)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to update status", e))?;

        if updated.rows_affected() == 0 {
            let actual =
                sqlx::query_scalar::<_, PresenceStatus>("SELECT status FROM members WHERE id = $1")
                    .bind(event.member_id)
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(|e| {
                        AppError::with_source(ErrorKind::Storage, "Failed to read status", e)
                    })?;

            // Dropping `tx` rolls back; nothing was written.
            return match actual {
                Some(actual) => {
                    debug!(member_id = %event.member_id, %expected, %actual, "Status moved before commit");
                    Ok(TransitionCommit::StatusChanged(actual))
                }
                None => Err(AppError::not_found(format!(
                    "Member {} not found",
                    event.member_id
                ))),
            };
        }

        let appended = sqlx::query_as::<_, AttendanceEvent>(
            "INSERT INTO attendance_events (member_id, action, place, note) \
             VALUES ($1, $2, $3, $4) \
             RETURNING *",
        )
        .bind(event.member_id)
        .bind(event.action)
        .bind(&event.place)
        .bind(&event.note)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to append event", e))?;

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to commit transition", e)
        })?;

        Ok(TransitionCommit::Committed(appended))
    }
}
