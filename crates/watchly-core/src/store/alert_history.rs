// ── Alert history feed ──
//
// One page at a time of the append-only alert-delivery log, either
// scoped to a single monitor or spanning all of the user's monitors.
// The scope is fixed at construction; a page of one scope never leaks
// into the other.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tokio::sync::watch;

use watchly_api::types::{AlertHistoryEntry, PageQuery};

use crate::error::CoreError;
use crate::session::SessionStore;
use crate::store::feed::{FeedCore, PageState};

pub struct AlertHistoryFeed {
    session: Arc<SessionStore>,
    monitor_id: Option<i64>,
    page_size: u32,
    window: Option<(NaiveDateTime, NaiveDateTime)>,
    state: FeedCore<AlertHistoryEntry>,
}

impl AlertHistoryFeed {
    /// Scope to one monitor's history, or to the whole account when
    /// `monitor_id` is `None`.
    pub fn new(session: Arc<SessionStore>, monitor_id: Option<i64>) -> Self {
        Self {
            session,
            monitor_id,
            page_size: 20,
            window: None,
            state: FeedCore::new(),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Restrict the feed to entries within `[start, end]`.
    pub fn with_window(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.window = Some((start, end));
        self
    }

    // ── Read path ────────────────────────────────────────────────────

    /// Fetch the current page.
    ///
    /// A missing token after a completed hydration means the session is
    /// no longer valid, so besides surfacing the error this asks the
    /// session store to log out.
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

        let result = match self.monitor_id {
            Some(monitor_id) => {
                self.session
                    .api()
                    .alert_history_for_monitor(&token, monitor_id, query)
                    .await
            }
            None => self.session.api().alert_history(&token, query).await,
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

    /// Advance one page (clamped to the last known page) and refetch if
    /// the cursor moved.
    pub async fn next_page(&self) {
        if self.state.advance() {
            self.refresh().await;
        }
    }

    /// Go back one page (clamped to page 0) and refetch if the cursor
    /// moved.
    pub async fn previous_page(&self) {
        if self.state.retreat() {
            self.refresh().await;
        }
    }

    // ── State observation ────────────────────────────────────────────

    pub fn snapshot(&self) -> PageState<AlertHistoryEntry> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<PageState<AlertHistoryEntry>> {
        self.state.subscribe()
    }
}
