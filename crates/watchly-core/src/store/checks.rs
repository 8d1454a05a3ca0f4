// ── Monitor check feed ──
//
// One page at a time of executed check results. Unlike the alert
// history feed, the scope is switchable at runtime: `select_monitor`
// flips between the per-monitor endpoint and the account-wide one.
// Page indices are not comparable across the two endpoints, so every
// scope switch resets the cursor to page 0.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::watch;

use watchly_api::types::{MonitorCheck, PageQuery};

use crate::error::CoreError;
use crate::session::SessionStore;
use crate::store::feed::{FeedCore, PageState};

pub struct CheckFeed {
    session: Arc<SessionStore>,
    /// `Some(id)` = one monitor's checks, `None` = all of the user's.
    scope: watch::Sender<Option<i64>>,
    page_size: u32,
    window: Option<(NaiveDateTime, NaiveDateTime)>,
    state: FeedCore<MonitorCheck>,
}

impl CheckFeed {
    pub fn new(session: Arc<SessionStore>, monitor_id: Option<i64>) -> Self {
        let (scope, _) = watch::channel(monitor_id);
        Self {
            session,
            scope,
            page_size: 20,
            window: None,
            state: FeedCore::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Restrict the feed to checks within `[start, end]`.
    pub fn with_window(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.window = Some((start, end));
        self
    }

    /// The monitor currently scoped to, if any.
    pub fn selected_monitor(&self) -> Option<i64> {
        *self.scope.borrow()
    }

    /// Switch between the per-monitor and account-wide endpoints.
    /// Resets the cursor to page 0 in both directions and refetches.
    pub async fn select_monitor(&self, monitor_id: Option<i64>) {
        self.scope.send_replace(monitor_id);
        self.state.reset_index();
        self.refresh().await;
    }

    // ── Read path ────────────────────────────────────────────────────

    /// Fetch the current page from the current scope's endpoint.
    ///
    /// Same token semantics as the alert history feed: a missing token
    /// surfaces the error and requests logout.
    pub async fn refresh(&self) {
        let epoch = self.state.begin_read();

        let Some(token) = self.session.token() else {
            self.state
                .complete_read(epoch, Err(CoreError::AuthenticationRequired.user_message()));
            self.session.logout();
            return;
        };

        let mut query = PageQuery::page(self.state.page_index());
        query.size = self.page_size;
        if let Some((start, end)) = self.window {
            query = query.with_window(start, end);
        }

        let result = match self.selected_monitor() {
            Some(monitor_id) => {
                self.session
                    .api()
                    .checks_for_monitor(&token, monitor_id, query)
                    .await
            }
            None => self.session.api().all_checks(&token, query).await,
        };

        match result {
            Ok(page) => {
                self.state.complete_read(epoch, Ok(page));
            }
            Err(e) => {
                let core = CoreError::from(e);
                let fatal = core.is_auth_missing();
                self.state.complete_read(epoch, Err(core.user_message()));
                if fatal {
                    self.session.logout();
                }
            }
        }
    }

    // ── Cursor navigation ────────────────────────────────────────────

    pub async fn next_page(&self) {
        if self.state.advance() {
            self.refresh().await;
        }
    }

    pub async fn previous_page(&self) {
        if self.state.retreat() {
            self.refresh().await;
        }
    }

    // ── State observation ────────────────────────────────────────────

    pub fn snapshot(&self) -> PageState<MonitorCheck> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<PageState<MonitorCheck>> {
        self.state.subscribe()
    }
}
