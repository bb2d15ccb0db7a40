//! Member repository implementation.

use sqlx::PgPool;

use imasu_core::error::{AppError, ErrorKind};
use imasu_core::result::AppResult;
use imasu_core::types::MemberId;
use imasu_entity::member::{CreateMember, Member, UpdateMember};
use imasu_entity::presence::PresenceStatus;

/// Repository for member rows.
#[derive(Debug, Clone)]
pub struct MemberRepository {
    pool: PgPool,
}

impl MemberRepository {
    /// Create a new member repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a member by primary key.
    pub async fn find_by_id(&self, id: MemberId) -> AppResult<Option<Member>> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to find member by id", e))
    }

    /// Find a member by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<Member>> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE LOWER(email) = LOWER($1)")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to find member by email", e)
            })
    }

    /// Whether a member row exists.
    pub async fn exists(&self, id: MemberId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM members WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to check member", e))
    }

    /// Read just the status column.
    pub async fn find_status(&self, id: MemberId) -> AppResult<Option<PresenceStatus>> {
        sqlx::query_scalar::<_, PresenceStatus>("SELECT status FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to read status", e))
    }

    /// Members with the given status, ordered for a stable listing.
    pub async fn find_by_status(&self, status: PresenceStatus) -> AppResult<Vec<Member>> {
        sqlx::query_as::<_, Member>(
            "SELECT * FROM members WHERE status = $1 \
             ORDER BY COALESCE(NULLIF(display_name, ''), email) ASC, id ASC",
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Storage, "Failed to list members by status", e)
        })
    }

    /// Create a new member. Status starts at the column default (`out`).
    pub async fn create(&self, data: &CreateMember) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            "INSERT INTO members (id, email, password_hash, display_name, original_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING *",
        )
        .bind(MemberId::new())
        .bind(&data.email)
        .bind(&data.password_hash)
        .bind(&data.display_name)
        .bind(&data.original_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err)
                if db_err.constraint() == Some("members_email_key") =>
            {
                AppError::conflict("Email already in use")
            }
            _ => AppError::with_source(ErrorKind::Storage, "Failed to create member", e),
        })
    }

    /// Update profile fields. The status column is never touched here.
    pub async fn update_profile(&self, data: &UpdateMember) -> AppResult<Member> {
        sqlx::query_as::<_, Member>(
            "UPDATE members SET display_name = COALESCE($2, display_name), \
                                color_code = COALESCE($3, color_code), \
                                original_id = COALESCE($4, original_id), \
                                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(data.id)
        .bind(&data.display_name)
        .bind(&data.color_code)
        .bind(&data.original_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to update member", e))?
        .ok_or_else(|| AppError::not_found(format!("Member {} not found", data.id)))
    }
}
