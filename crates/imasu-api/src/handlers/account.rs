//! Account handlers: registration and token issuance.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{Form, Json};
use validator::Validate;

use imasu_service::RegisterAccount;

use crate::dto::request::{CreateAccountRequest, TokenRequest};
use crate::dto::response::{AccountResponse, ApiResponse, TokenResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// POST /api/users
pub async fn create_account(
    State(state): State<AppState>,
    Json(req): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AccountResponse>>), ApiError> {
    req.validate()?;

    let (member, token) = state
        .account_service
        .register(RegisterAccount {
            email: req.email,
            password: req.password,
            display_name: req.display_name,
            original_id: req.original_id,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(AccountResponse {
            member: member.into(),
            token: token.into(),
        })),
    ))
}

/// POST /api/token
pub async fn issue_token(
    State(state): State<AppState>,
    Form(req): Form<TokenRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    req.validate()?;

    let token = state
        .account_service
        .login(&req.username, &req.password)
        .await?;

    Ok(Json(ApiResponse::ok(token.into())))
}
