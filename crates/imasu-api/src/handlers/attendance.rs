//! Attendance log handlers: applying actions and reading history.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use imasu_service::ApplyAction;

use crate::dto::request::CreateLogRequest;
use crate::dto::response::{ApiResponse, LogResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// POST /api/users/me/logs
pub async fn create_log(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateLogRequest>,
) -> Result<(StatusCode, Json<ApiResponse<LogResponse>>), ApiError> {
    let event = state
        .presence_service
        .apply(
            &auth,
            ApplyAction {
                action: req.action,
                place: req.place,
                note: req.note,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(event.into()))))
}

/// GET /api/users/me/logs
pub async fn list_logs(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<LogResponse>>>, ApiError> {
    let history = state.presence_service.history(&auth).await?;
    Ok(Json(ApiResponse::ok(
        history.into_iter().map(LogResponse::from).collect(),
    )))
}
