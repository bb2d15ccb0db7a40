//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use imasu_auth::gate::JwtGate;
use imasu_auth::jwt::JwtEncoder;
use imasu_auth::password::{PasswordHasher, PasswordValidator};
use imasu_core::config::AppConfig;
use imasu_core::traits::CredentialResolver;
use imasu_database::PresenceStore;
use imasu_service::{AccountService, MemberService, PresenceService, RosterService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    pub config: Arc<AppConfig>,

    // ── Infrastructure ───────────────────────────────────────
    pub store: Arc<dyn PresenceStore>,

    // ── Auth ─────────────────────────────────────────────────
    /// Resolves bearer tokens for [`AuthUser`](crate::extractors::AuthUser).
    pub gate: Arc<dyn CredentialResolver>,

    // ── Services ─────────────────────────────────────────────
    pub account_service: Arc<AccountService>,
    pub member_service: Arc<MemberService>,
    pub presence_service: Arc<PresenceService>,
    pub roster_service: Arc<RosterService>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("presence_service", &self.presence_service)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires auth and services around an opened store.
    pub fn new(config: AppConfig, store: Arc<dyn PresenceStore>) -> Self {
        let hasher = Arc::new(PasswordHasher::new());
        let validator = Arc::new(PasswordValidator::new(&config.auth));
        let encoder = Arc::new(JwtEncoder::new(&config.auth));
        let gate: Arc<dyn CredentialResolver> =
            Arc::new(JwtGate::new(&config.auth, Arc::clone(&store)));

        let account_service = Arc::new(AccountService::new(
            Arc::clone(&store),
            hasher,
            validator,
            encoder,
        ));
        let member_service = Arc::new(MemberService::new(Arc::clone(&store)));
        let presence_service = Arc::new(PresenceService::new(
            Arc::clone(&store),
            config.presence.clone(),
        ));
        let roster_service = Arc::new(RosterService::new(Arc::clone(&store)));

        Self {
            config: Arc::new(config),
            store,
            gate,
            account_service,
            member_service,
            presence_service,
            roster_service,
        }
    }
}
