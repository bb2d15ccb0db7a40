//! `AuthUser` extractor: pulls the bearer token from the Authorization
//! header and resolves it through the credential gate.

use axum::extract::FromRequestParts;
use axum::http::header;
use axum::http::request::Parts;

use imasu_core::error::AppError;
use imasu_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated member, available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl AuthUser {
    pub fn context(&self) -> &RequestContext {
        &self.0
    }
}

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::unauthenticated("Missing Authorization header"))?;

        let token = match auth_header.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token,
            _ => {
                return Err(AppError::unauthenticated("Invalid Authorization header format").into());
            }
        };

        let member_id = state.gate.resolve(token).await?;

        Ok(AuthUser(RequestContext::new(member_id)))
    }
}
