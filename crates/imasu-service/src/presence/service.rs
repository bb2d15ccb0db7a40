//! Applying presence actions and reading a member's attendance log.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use imasu_core::config::PresenceConfig;
use imasu_core::error::AppError;
use imasu_core::result::AppResult;
use imasu_core::types::MemberId;
use imasu_database::PresenceStore;
use imasu_entity::attendance::{AttendanceEvent, NewAttendanceEvent, TransitionCommit};
use imasu_entity::presence::PresenceAction;

use crate::context::RequestContext;

/// Compare-and-swap misses tolerated before giving up on one apply.
const MAX_STATUS_RACES: u32 = 8;

/// An action submitted by the acting member.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplyAction {
    /// The requested action.
    pub action: PresenceAction,
    /// Location tag; blank or absent means the configured default.
    pub place: Option<String>,
    /// Free-text annotation.
    pub note: Option<String>,
}

/// Drives the presence state machine for one member at a time.
///
/// Calls for the same member are serialised by a per-member async lock;
/// calls for different members never wait on each other. The store's
/// compare-and-swap on the prior status covers writers in other processes.
pub struct PresenceService {
    store: Arc<dyn PresenceStore>,
    config: PresenceConfig,
    locks: DashMap<MemberId, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for PresenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresenceService")
            .field("config", &self.config)
            .field("locked_members", &self.locks.len())
            .finish()
    }
}

impl PresenceService {
    pub fn new(store: Arc<dyn PresenceStore>, config: PresenceConfig) -> Self {
        Self {
            store,
            config,
            locks: DashMap::new(),
        }
    }

    /// Validates `request.action` against the member's current status and,
    /// if legal, commits the event and the new status together.
    ///
    /// Illegal actions fail with `InvalidTransition` and write nothing.
    pub async fn apply(
        &self,
        ctx: &RequestContext,
        request: ApplyAction,
    ) -> AppResult<AttendanceEvent> {
        let member_id = ctx.member_id;
        let event = NewAttendanceEvent {
            member_id,
            action: request.action,
            place: self.normalize_place(request.place)?,
            note: self.normalize_note(request.note)?,
        };

        let lock = self.member_lock(member_id);
        let _guard = lock.lock().await;

        let mut current = self.store.current_status(member_id).await?;
        let mut storage_retries = 0u32;
        let mut races = 0u32;

        loop {
            let next = current.apply(event.action).map_err(|rejected| {
                debug!(%member_id, action = %event.action, status = %current, "Transition rejected");
                AppError::from(rejected)
            })?;

            match self.store.append_transition(current, next, &event).await {
                Ok(TransitionCommit::Committed(committed)) => {
                    info!(
                        %member_id,
                        action = %committed.action,
                        from = %current,
                        status = %next,
                        event_id = committed.id,
                        place = %committed.place,
                        "Presence changed"
                    );
                    return Ok(committed);
                }
                Ok(TransitionCommit::StatusChanged(actual)) => {
                    races += 1;
                    if races > MAX_STATUS_RACES {
                        return Err(AppError::storage(format!(
                            "Status of member {member_id} kept changing during apply"
                        )));
                    }
                    debug!(%member_id, expected = %current, %actual, "Re-evaluating after concurrent change");
                    current = actual;
                }
                Err(err)
                    if err.is_retryable()
                        && storage_retries < self.config.storage_retry_attempts =>
                {
                    // Every transition changes the status, so an unchanged
                    // status means nothing was committed.
                    match self.store.current_status(member_id).await {
                        Ok(status) if status == current => {}
                        _ => return Err(err),
                    }

                    storage_retries += 1;
                    warn!(
                        %member_id,
                        action = %event.action,
                        attempt = storage_retries,
                        error = %err,
                        "Storage failure before commit, retrying"
                    );
                    tokio::time::sleep(self.backoff(storage_retries)).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// The acting member's events, newest first.
    pub async fn history(&self, ctx: &RequestContext) -> AppResult<Vec<AttendanceEvent>> {
        self.store.history(ctx.member_id).await
    }

    fn member_lock(&self, member_id: MemberId) -> Arc<Mutex<()>> {
        self.locks
            .entry(member_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .value()
            .clone()
    }

    fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.config.storage_retry_backoff_ms * u64::from(attempt))
    }

    fn normalize_place(&self, place: Option<String>) -> AppResult<String> {
        let place = place
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| self.config.default_place.clone());

        if place.chars().count() > self.config.max_place_length {
            return Err(AppError::validation(format!(
                "Place must be at most {} characters",
                self.config.max_place_length
            )));
        }
        Ok(place)
    }

    fn normalize_note(&self, note: Option<String>) -> AppResult<Option<String>> {
        let Some(note) = note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) else {
            return Ok(None);
        };

        if note.chars().count() > self.config.max_note_length {
            return Err(AppError::validation(format!(
                "Note must be at most {} characters",
                self.config.max_note_length
            )));
        }
        Ok(Some(note))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use imasu_core::error::ErrorKind;
    use imasu_database::MemoryPresenceStore;
    use imasu_entity::member::{CreateMember, Member, UpdateMember};
    use imasu_entity::presence::{PresenceStatus, replay};

    fn config() -> PresenceConfig {
        PresenceConfig {
            storage_retry_backoff_ms: 1,
            ..PresenceConfig::default()
        }
    }

    async fn member(store: &Arc<dyn PresenceStore>, email: &str) -> RequestContext {
        let member = store
            .create_member(&CreateMember {
                email: email.to_string(),
                password_hash: "hash".to_string(),
                display_name: None,
                original_id: None,
            })
            .await
            .unwrap();
        RequestContext::new(member.id)
    }

    fn act(action: PresenceAction) -> ApplyAction {
        ApplyAction {
            action,
            place: None,
            note: None,
        }
    }

    fn setup() -> (Arc<dyn PresenceStore>, PresenceService) {
        let store: Arc<dyn PresenceStore> = Arc::new(MemoryPresenceStore::new());
        let service = PresenceService::new(store.clone(), config());
        (store, service)
    }

    #[tokio::test]
    async fn test_enter_from_out_records_event() {
        let (store, service) = setup();
        let ctx = member(&store, "a@example.com").await;

        let event = service
            .apply(
                &ctx,
                ApplyAction {
                    action: PresenceAction::Enter,
                    place: None,
                    note: Some("morning".to_string()),
                },
            )
            .await
            .unwrap();

        assert_eq!(event.action, PresenceAction::Enter);
        assert_eq!(event.place, "room");
        assert_eq!(event.note.as_deref(), Some("morning"));
        assert_eq!(
            store.current_status(ctx.member_id).await.unwrap(),
            PresenceStatus::In
        );
        assert_eq!(service.history(&ctx).await.unwrap(), vec![event]);
    }

    #[tokio::test]
    async fn test_round_trip_through_away() {
        let (store, service) = setup();
        let ctx = member(&store, "a@example.com").await;

        for action in [
            PresenceAction::Enter,
            PresenceAction::GoOut,
            PresenceAction::Return,
            PresenceAction::Exit,
        ] {
            service.apply(&ctx, act(action)).await.unwrap();
        }

        let history = service.history(&ctx).await.unwrap();
        let actions: Vec<_> = history.iter().rev().map(|e| e.action).collect();
        assert_eq!(
            actions,
            vec![
                PresenceAction::Enter,
                PresenceAction::GoOut,
                PresenceAction::Return,
                PresenceAction::Exit
            ]
        );
        assert_eq!(
            store.current_status(ctx.member_id).await.unwrap(),
            PresenceStatus::Out
        );
    }

    #[tokio::test]
    async fn test_illegal_action_is_rejected_without_writing() {
        let (store, service) = setup();
        let ctx = member(&store, "a@example.com").await;

        let err = service
            .apply(&ctx, act(PresenceAction::Exit))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::InvalidTransition);
        let details = err.details.unwrap();
        assert_eq!(details["current_status"], "out");
        assert_eq!(details["action"], "exit");
        assert!(service.history(&ctx).await.unwrap().is_empty());
        assert_eq!(
            store.current_status(ctx.member_id).await.unwrap(),
            PresenceStatus::Out
        );
    }

    #[tokio::test]
    async fn test_every_illegal_pair_leaves_log_unchanged() {
        let (store, service) = setup();
        let ctx = member(&store, "a@example.com").await;
        let reach = [
            (PresenceStatus::Out, vec![]),
            (PresenceStatus::In, vec![PresenceAction::Enter]),
            (PresenceStatus::Away, vec![PresenceAction::GoOut]),
        ];

        for (status, steps) in reach {
            for step in steps {
                service.apply(&ctx, act(step)).await.unwrap();
            }
            assert_eq!(store.current_status(ctx.member_id).await.unwrap(), status);

            for action in PresenceAction::ALL {
                if status.next(action).is_some() {
                    continue;
                }
                let before = service.history(&ctx).await.unwrap().len();
                let err = service.apply(&ctx, act(action)).await.unwrap_err();
                assert_eq!(err.kind, ErrorKind::InvalidTransition);
                assert_eq!(service.history(&ctx).await.unwrap().len(), before);
            }
        }
    }

    #[tokio::test]
    async fn test_place_defaults_and_limits() {
        let (store, service) = setup();
        let ctx = member(&store, "a@example.com").await;

        let event = service
            .apply(
                &ctx,
                ApplyAction {
                    action: PresenceAction::Enter,
                    place: Some("   ".to_string()),
                    note: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(event.place, "room");

        let err = service
            .apply(
                &ctx,
                ApplyAction {
                    action: PresenceAction::GoOut,
                    place: Some("x".repeat(65)),
                    note: None,
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
        assert_eq!(service.history(&ctx).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_over_long_note_is_rejected() {
        let (store, service) = setup();
        let ctx = member(&store, "a@example.com").await;

        let err = service
            .apply(
                &ctx,
                ApplyAction {
                    action: PresenceAction::Enter,
                    place: None,
                    note: Some("n".repeat(501)),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_conflicting_actions_accept_exactly_one() {
        let (store, service) = setup();
        let service = Arc::new(service);
        let ctx = member(&store, "a@example.com").await;
        service.apply(&ctx, act(PresenceAction::Enter)).await.unwrap();

        let exit = {
            let service = service.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move { service.apply(&ctx, act(PresenceAction::Exit)).await })
        };
        let go_out = {
            let service = service.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move { service.apply(&ctx, act(PresenceAction::GoOut)).await })
        };

        let results = [exit.await.unwrap(), go_out.await.unwrap()];
        let accepted = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(accepted, 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|e| e.kind == ErrorKind::InvalidTransition)
        );
        assert_eq!(service.history(&ctx).await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_concurrent_enters_accept_exactly_one() {
        let (store, service) = setup();
        let service = Arc::new(service);
        let ctx = member(&store, "a@example.com").await;

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let service = service.clone();
                let ctx = ctx.clone();
                tokio::spawn(async move { service.apply(&ctx, act(PresenceAction::Enter)).await })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
    }

    #[tokio::test]
    async fn test_history_replays_to_current_status() {
        let (store, service) = setup();
        let ctx = member(&store, "a@example.com").await;
        let script = [
            PresenceAction::Enter,
            PresenceAction::Exit,
            PresenceAction::Enter,
            PresenceAction::GoOut,
        ];
        for action in script {
            service.apply(&ctx, act(action)).await.unwrap();
        }

        let history = service.history(&ctx).await.unwrap();
        let replayed = replay(history.iter().rev().map(|e| e.action)).unwrap();
        assert_eq!(replayed, store.current_status(ctx.member_id).await.unwrap());
        assert_eq!(replayed, PresenceStatus::Away);
    }

    #[tokio::test]
    async fn test_history_of_unknown_member_is_not_found() {
        let (_, service) = setup();
        let err = service
            .history(&RequestContext::new(MemberId::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    /// Fails the first `failures` appends, optionally after committing.
    struct FlakyStore {
        inner: MemoryPresenceStore,
        failures: AtomicU32,
        commit_before_failing: bool,
    }

    impl FlakyStore {
        fn new(failures: u32, commit_before_failing: bool) -> Self {
            Self {
                inner: MemoryPresenceStore::new(),
                failures: AtomicU32::new(failures),
                commit_before_failing,
            }
        }
    }

    #[async_trait]
    impl PresenceStore for FlakyStore {
        async fn create_member(&self, data: &CreateMember) -> AppResult<Member> {
            self.inner.create_member(data).await
        }

        async fn find_member(&self, id: MemberId) -> AppResult<Option<Member>> {
            self.inner.find_member(id).await
        }

        async fn find_member_by_email(&self, email: &str) -> AppResult<Option<Member>> {
            self.inner.find_member_by_email(email).await
        }

        async fn update_profile(&self, data: &UpdateMember) -> AppResult<Member> {
            self.inner.update_profile(data).await
        }

        async fn members_with_status(&self, status: PresenceStatus) -> AppResult<Vec<Member>> {
            self.inner.members_with_status(status).await
        }

        async fn current_status(&self, id: MemberId) -> AppResult<PresenceStatus> {
            self.inner.current_status(id).await
        }

        async fn append_transition(
            &self,
            expected: PresenceStatus,
            next: PresenceStatus,
            event: &NewAttendanceEvent,
        ) -> AppResult<TransitionCommit> {
            let remaining = self.failures.load(Ordering::SeqCst);
            if remaining == 0 {
                return self.inner.append_transition(expected, next, event).await;
            }
            self.failures.store(remaining - 1, Ordering::SeqCst);
            if self.commit_before_failing {
                self.inner.append_transition(expected, next, event).await?;
            }
            Err(AppError::storage("connection reset"))
        }

        async fn history(&self, id: MemberId) -> AppResult<Vec<AttendanceEvent>> {
            self.inner.history(id).await
        }

        async fn health_check(&self) -> AppResult<bool> {
            self.inner.health_check().await
        }
    }

    #[tokio::test]
    async fn test_transient_storage_failure_is_retried() {
        let store: Arc<dyn PresenceStore> = Arc::new(FlakyStore::new(1, false));
        let service = PresenceService::new(store.clone(), config());
        let ctx = member(&store, "a@example.com").await;

        service.apply(&ctx, act(PresenceAction::Enter)).await.unwrap();

        assert_eq!(service.history(&ctx).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_persistent_storage_failure_is_surfaced() {
        let store: Arc<dyn PresenceStore> = Arc::new(FlakyStore::new(10, false));
        let service = PresenceService::new(store.clone(), config());
        let ctx = member(&store, "a@example.com").await;

        let err = service
            .apply(&ctx, act(PresenceAction::Enter))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Storage);
        assert!(service.history(&ctx).await.unwrap().is_empty());
        assert_eq!(
            store.current_status(ctx.member_id).await.unwrap(),
            PresenceStatus::Out
        );
    }

    #[tokio::test]
    async fn test_failure_after_commit_is_not_retried() {
        let store: Arc<dyn PresenceStore> = Arc::new(FlakyStore::new(1, true));
        let service = PresenceService::new(store.clone(), config());
        let ctx = member(&store, "a@example.com").await;

        let err = service
            .apply(&ctx, act(PresenceAction::Enter))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Storage);
        assert_eq!(service.history(&ctx).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_retry_disabled_surfaces_first_failure() {
        let store: Arc<dyn PresenceStore> = Arc::new(FlakyStore::new(1, false));
        let service = PresenceService::new(
            store.clone(),
            PresenceConfig {
                storage_retry_attempts: 0,
                ..config()
            },
        );
        let ctx = member(&store, "a@example.com").await;

        let err = service
            .apply(&ctx, act(PresenceAction::Enter))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Storage);
    }
}
