//! Member handlers: own profile and the roster.

use axum::Json;
use axum::extract::{Query, State};
use validator::Validate;

use imasu_entity::presence::PresenceStatus;
use imasu_service::{RosterEntry, UpdateProfile};

use crate::dto::request::{RosterQuery, UpdateProfileRequest};
use crate::dto::response::{ApiResponse, MemberResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/me
pub async fn get_me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<MemberResponse>>, ApiError> {
    let member = state.member_service.get_profile(&auth).await?;
    Ok(Json(ApiResponse::ok(member.into())))
}

/// PUT /api/users/me
pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<MemberResponse>>, ApiError> {
    req.validate()?;

    let member = state
        .member_service
        .update_profile(
            &auth,
            UpdateProfile {
                display_name: req.display_name,
                color_code: req.color_code,
                original_id: req.original_id,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(member.into())))
}

/// GET /api/users?status=in
pub async fn list_members(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<RosterQuery>,
) -> Result<Json<ApiResponse<Vec<RosterEntry>>>, ApiError> {
    let entries = match query.status.as_deref() {
        None => state.roster_service.currently_present().await?,
        Some(raw) => {
            let status: PresenceStatus = raw.parse()?;
            state.roster_service.by_status(status).await?
        }
    };

    Ok(Json(ApiResponse::ok(entries)))
}
