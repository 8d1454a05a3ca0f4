// ── Alert configuration collection ──
//
// Alert rules for one monitor. Always fetched and mutated in the
// context of a monitor id; `set_monitor` rescopes the collection.
// Reconciliation policy: full refetch — every successful mutation is
// followed by a fresh GET of the whole list. O(n) per write and more
// network traffic than the monitor collection's optimistic merge, but
// the snapshot is always authoritative.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use watchly_api::types::{AlertConfiguration, CreateAlertConfigRequest};

use crate::error::CoreError;
use crate::session::SessionStore;
use crate::store::state::{CollectionState, SyncState};

pub struct AlertConfigCollection {
    session: Arc<SessionStore>,
    monitor_id: AtomicI64,
    state: SyncState<AlertConfiguration>,
}

impl AlertConfigCollection {
    pub fn new(session: Arc<SessionStore>, monitor_id: i64) -> Self {
        Self {
            session,
            monitor_id: AtomicI64::new(monitor_id),
            state: SyncState::new(),
        }
    }

    /// The monitor this collection is currently scoped to.
    pub fn monitor_id(&self) -> i64 {
        self.monitor_id.load(Ordering::SeqCst)
    }

    /// Rescope to a different monitor and refetch. The old snapshot is
    /// dropped immediately — configs of one monitor are meaningless in
    /// the context of another.
    pub async fn set_monitor(&self, monitor_id: i64) {
        self.monitor_id.store(monitor_id, Ordering::SeqCst);
        self.refresh().await;
    }

    // ── Read path ────────────────────────────────────────────────────

    /// Fetch the alert configurations of the scoped monitor.
    pub async fn refresh(&self) {
        let epoch = self.state.begin_read();

        let Some(token) = self.session.token() else {
            self.state
                .complete_read(epoch, Err(CoreError::AuthenticationRequired.user_message()));
            return;
        };

        let monitor_id = self.monitor_id();
        let result = self
            .session
            .api()
            .list_alert_configs(&token, monitor_id)
            .await
            .map_err(|e| CoreError::from(e).user_message());

        if self.state.complete_read(epoch, result) {
            debug!(
                monitor_id,
                count = self.state.snapshot().items.len(),
                "alert configs refreshed"
            );
        }
    }

    // ── Write path (refetch after success) ───────────────────────────

    pub async fn create(
        &self,
        payload: &CreateAlertConfigRequest,
    ) -> Result<AlertConfiguration, CoreError> {
        let token = self.require_token_for_mutation()?;
        self.state.begin_mutation();

        match self
            .session
            .api()
            .create_alert_config(&token, self.monitor_id(), payload)
            .await
        {
            Ok(created) => {
                self.state.complete_mutation_ok(|_| {});
                self.refresh().await;
                Ok(created)
            }
            Err(e) => Err(self.record_mutation_failure(e)),
        }
    }

    pub async fn update(
        &self,
        config_id: i64,
        payload: &CreateAlertConfigRequest,
    ) -> Result<AlertConfiguration, CoreError> {
        let token = self.require_token_for_mutation()?;
        self.state.begin_mutation();

        match self
            .session
            .api()
            .update_alert_config(&token, self.monitor_id(), config_id, payload)
            .await
        {
            Ok(updated) => {
                self.state.complete_mutation_ok(|_| {});
                self.refresh().await;
                Ok(updated)
            }
            Err(e) => Err(self.record_mutation_failure(e)),
        }
    }

    pub async fn delete(&self, config_id: i64) -> Result<(), CoreError> {
        let token = self.require_token_for_mutation()?;
        self.state.begin_mutation();

        match self
            .session
            .api()
            .delete_alert_config(&token, self.monitor_id(), config_id)
            .await
        {
            Ok(()) => {
                self.state.complete_mutation_ok(|_| {});
                self.refresh().await;
                Ok(())
            }
            Err(e) => Err(self.record_mutation_failure(e)),
        }
    }

    // ── State observation ────────────────────────────────────────────

    pub fn snapshot(&self) -> CollectionState<AlertConfiguration> {
        self.state.snapshot()
    }

    pub fn configs(&self) -> Arc<Vec<AlertConfiguration>> {
        self.state.snapshot().items
    }

    pub fn subscribe(&self) -> watch::Receiver<CollectionState<AlertConfiguration>> {
        self.state.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

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
