//! The credential gate in front of every authenticated operation.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use imasu_core::config::AuthConfig;
use imasu_core::error::AppError;
use imasu_core::result::AppResult;
use imasu_core::traits::CredentialResolver;
use imasu_core::types::MemberId;
use imasu_database::PresenceStore;

use crate::jwt::JwtDecoder;

/// Resolves JWT access tokens to members that still exist.
#[derive(Clone)]
pub struct JwtGate {
    decoder: JwtDecoder,
    store: Arc<dyn PresenceStore>,
}

impl std::fmt::Debug for JwtGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtGate")
            .field("decoder", &self.decoder)
            .finish()
    }
}

impl JwtGate {
    pub fn new(config: &AuthConfig, store: Arc<dyn PresenceStore>) -> Self {
        Self {
            decoder: JwtDecoder::new(config),
            store,
        }
    }
}

#[async_trait]
impl CredentialResolver for JwtGate {
    async fn resolve(&self, credential: &str) -> AppResult<MemberId> {
        let credential = credential.trim();
        if credential.is_empty() {
            return Err(AppError::unauthenticated("Missing credential"));
        }

        let claims = self.decoder.decode(credential)?;
        let member_id = claims.member_id();

        // A valid signature for a member that no longer resolves is still unknown.
        if self.store.find_member(member_id).await?.is_none() {
            debug!(%member_id, "Token subject does not exist");
            return Err(AppError::unauthenticated("Unknown member"));
        }

        Ok(member_id)
    }
}
