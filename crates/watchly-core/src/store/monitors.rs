// ── Monitor collection ──
//
// Keeps the user's full monitor list synchronized with the backend.
// Reconciliation policy: optimistic merge — successful mutations patch
// the local snapshot from the server's response instead of refetching
// the whole collection. O(1) per write; can drift if another client
// mutates concurrently (a refresh() reconverges).

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use watchly_api::types::{CreateMonitorRequest, Monitor};

use crate::error::CoreError;
use crate::session::SessionStore;
use crate::store::state::{CollectionState, SyncState};

pub struct MonitorCollection {
    session: Arc<SessionStore>,
    state: SyncState<Monitor>,
}

impl MonitorCollection {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            state: SyncState::new(),
        }
    }

    // ── Read path ────────────────────────────────────────────────────

    /// Fetch the monitor list and replace the snapshot.
    ///
    /// Without a token this fails immediately — snapshot cleared, error
    /// set, no network call. Epoch stamping guarantees that when several
    /// refreshes overlap, only the most recently initiated one lands.
    pub async fn refresh(&self) {
        let epoch = self.state.begin_read();

        let Some(token) = self.session.token() else {
            self.state
                .complete_read(epoch, Err(CoreError::AuthenticationRequired.user_message()));
            return;
        };

        let result = self
            .session
            .api()
            .list_monitors(&token)
            .await
            .map_err(|e| CoreError::from(e).user_message());

        if self.state.complete_read(epoch, result) {
            debug!(count = self.state.snapshot().items.len(), "monitors refreshed");
        }
    }

    /// Fetch a single monitor without touching the collection snapshot
    /// (e.g. to seed an edit form). Failures are recorded against the
    /// read-path error but leave the current items in place.
    pub async fn fetch_by_id(&self, id: i64) -> Result<Monitor, CoreError> {
        let token = self.require_token_for_read()?;

        match self.session.api().get_monitor(&token, id).await {
            Ok(monitor) => Ok(monitor),
            Err(e) => {
                let core = CoreError::from(e);
                self.state.note_read_error(core.user_message());
                Err(core)
            }
        }
    }

    // ── Write path (optimistic merge) ────────────────────────────────

    /// Create a monitor and append the server-returned entity to the
    /// snapshot.
    pub async fn create(&self, payload: &CreateMonitorRequest) -> Result<Monitor, CoreError> {
        let token = self.require_token_for_mutation()?;
        self.state.begin_mutation();

        match self.session.api().create_monitor(&token, payload).await {
            Ok(created) => {
                let merged = created.clone();
                self.state.complete_mutation_ok(move |items| items.push(merged));
                Ok(created)
            }
            Err(e) => Err(self.record_mutation_failure(e)),
        }
    }

    /// Update a monitor, replacing the snapshot entry whose id matches.
    /// The server's response is authoritative, not the request payload.
    pub async fn update(
        &self,
        id: i64,
        payload: &CreateMonitorRequest,
    ) -> Result<Monitor, CoreError> {
        let token = self.require_token_for_mutation()?;
        self.state.begin_mutation();

        match self.session.api().update_monitor(&token, id, payload).await {
            Ok(updated) => {
                let merged = updated.clone();
                self.state.complete_mutation_ok(move |items| {
                    for item in items.iter_mut() {
                        if item.id == merged.id {
                            *item = merged;
                            break;
                        }
                    }
                });
                Ok(updated)
            }
            Err(e) => Err(self.record_mutation_failure(e)),
        }
    }

    /// Delete a monitor and drop the matching snapshot entry.
    pub async fn delete(&self, id: i64) -> Result<(), CoreError> {
        let token = self.require_token_for_mutation()?;
        self.state.begin_mutation();

        match self.session.api().delete_monitor(&token, id).await {
            Ok(()) => {
                self.state.complete_mutation_ok(|items| items.retain(|m| m.id != id));
                Ok(())
            }
            Err(e) => Err(self.record_mutation_failure(e)),
        }
    }

    // ── State observation ────────────────────────────────────────────

    pub fn snapshot(&self) -> CollectionState<Monitor> {
        self.state.snapshot()
    }

    /// The current items, without the status flags.
    pub fn monitors(&self) -> Arc<Vec<Monitor>> {
        self.state.snapshot().items
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState<Monitor>> {
        self.state.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn require_token_for_read(&self) -> Result<secrecy::SecretString, CoreError> {
        self.session.token().ok_or_else(|| {
            let err = CoreError::AuthenticationRequired;
            self.state.note_read_error(err.user_message());
            err
        })
    }

    /// A missing token on the write path invalidates the whole session:
    /// hydration has long completed, so there is nothing to wait for.
    fn require_token_for_mutation(&self) -> Result<secrecy::SecretString, CoreError> {
        self.session.token().ok_or_else(|| {
            let err = CoreError::AuthenticationRequired;
            self.state.reject_mutation(err.user_message());
            self.session.logout();
            err
        })
    }

    fn record_mutation_failure(&self, e: watchly_api::Error) -> CoreError {
        let core = CoreError::from(e);
        self.state.complete_mutation_err(core.user_message());
        if core.is_auth_missing() {
            self.session.logout();
        }
        core
    }
}
