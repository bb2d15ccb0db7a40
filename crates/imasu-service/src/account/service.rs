//! Account registration and password login.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use imasu_auth::jwt::{IssuedToken, JwtEncoder};
use imasu_auth::password::{PasswordHasher, PasswordValidator};
use imasu_core::error::AppError;
use imasu_core::result::AppResult;
use imasu_database::PresenceStore;
use imasu_entity::member::{CreateMember, Member};

/// Data for creating an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterAccount {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    pub original_id: Option<String>,
}

/// Creates members and exchanges passwords for access tokens.
#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn PresenceStore>,
    hasher: Arc<PasswordHasher>,
    validator: Arc<PasswordValidator>,
    encoder: Arc<JwtEncoder>,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("validator", &self.validator)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    pub fn new(
        store: Arc<dyn PresenceStore>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        encoder: Arc<JwtEncoder>,
    ) -> Self {
        Self {
            store,
            hasher,
            validator,
            encoder,
        }
    }

    /// Registers a member (initially `out`) and issues their first token.
    pub async fn register(&self, req: RegisterAccount) -> AppResult<(Member, IssuedToken)> {
        let email = normalize_email(&req.email)?;
        self.validator.validate(&req.password)?;

        let password_hash = self.hasher.hash_password(&req.password)?;
        let member = self
            .store
            .create_member(&CreateMember {
                email,
                password_hash,
                display_name: blank_to_none(req.display_name),
                original_id: blank_to_none(req.original_id),
            })
            .await?;

        let token = self.encoder.issue(member.id)?;

        info!(member_id = %member.id, "Member registered");

        Ok((member, token))
    }

    /// Verifies `email` and `password` and issues an access token.
    ///
    /// Unknown emails and wrong passwords fail identically.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<IssuedToken> {
        let email = email.trim().to_lowercase();
        let Some(member) = self.store.find_member_by_email(&email).await? else {
            warn!("Login attempt for unknown email");
            return Err(invalid_credentials());
        };

        if !self.hasher.verify_password(password, &member.password_hash)? {
            warn!(member_id = %member.id, "Login attempt with wrong password");
            return Err(invalid_credentials());
        }

        let token = self.encoder.issue(member.id)?;
        info!(member_id = %member.id, "Member logged in");

        Ok(token)
    }
}

fn invalid_credentials() -> AppError {
    AppError::unauthenticated("Incorrect email or password")
}

fn normalize_email(email: &str) -> AppResult<String> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::validation("Invalid email format")),
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
