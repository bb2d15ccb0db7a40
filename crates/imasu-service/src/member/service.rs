//! Member self-service: viewing and editing one's own profile.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use imasu_core::error::AppError;
use imasu_core::result::AppResult;
use imasu_database::PresenceStore;
use imasu_entity::member::{Member, UpdateMember};

use crate::context::RequestContext;

/// Profile fields a member may change. Status is not one of them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfile {
    pub display_name: Option<String>,
    pub color_code: Option<String>,
    pub original_id: Option<String>,
}

/// Handles profile operations for the acting member.
#[derive(Clone)]
pub struct MemberService {
    store: Arc<dyn PresenceStore>,
}

impl std::fmt::Debug for MemberService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberService").finish_non_exhaustive()
    }
}

impl MemberService {
    pub fn new(store: Arc<dyn PresenceStore>) -> Self {
        Self { store }
    }

    /// Gets the acting member's profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> AppResult<Member> {
        self.store
            .find_member(ctx.member_id)
            .await?
            .ok_or_else(|| AppError::not_found("Member not found"))
    }

    /// Updates the acting member's profile fields.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        req: UpdateProfile,
    ) -> AppResult<Member> {
        let display_name = req.display_name.map(|n| n.trim().to_string());
        if display_name.as_deref().is_some_and(str::is_empty) {
            return Err(AppError::validation("Display name cannot be empty"));
        }

        let member = self
            .store
            .update_profile(&UpdateMember {
                id: ctx.member_id,
                display_name,
                color_code: req.color_code,
                original_id: req.original_id,
            })
            .await?;

        info!(member_id = %ctx.member_id, "Profile updated");

        Ok(member)
    }
}
