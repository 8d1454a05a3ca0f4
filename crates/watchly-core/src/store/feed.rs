// ── Generic paged feed state ──
//
// Shared machinery for the read-only paginated feeds: one page of data,
// cursor arithmetic, and the same epoch-stamped read discipline as the
// collections.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::warn;

use watchly_api::types::Page;

/// Observable state of a paged feed.
#[derive(Debug, Clone)]
pub struct PageState<T> {
    pub page: Option<Page<T>>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub page_index: u32,
    pub total_pages: u32,
}

impl<T> Default for PageState<T> {
    fn default() -> Self {
        Self {
            page: None,
            is_loading: false,
            error: None,
            page_index: 0,
            total_pages: 0,
        }
    }
}

/// Reactive holder for a [`PageState`], with epoch-stamped reads and
/// clamped cursor navigation.
pub(crate) struct FeedCore<T: Clone + Send + Sync + 'static> {
    tx: watch::Sender<PageState<T>>,
    read_epoch: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> FeedCore<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(PageState::default());
        Self {
            tx,
            read_epoch: AtomicU64::new(0),
        }
    }

    // ── Read path ────────────────────────────────────────────────────

    pub(crate) fn begin_read(&self) -> u64 {
        let epoch = self.read_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        epoch
    }

    /// Apply a read completion. On failure the previous page is
    /// discarded rather than left stale. Returns `false` when a newer
    /// read has been initiated since.
    pub(crate) fn complete_read(&self, epoch: u64, result: Result<Page<T>, String>) -> bool {
        if epoch != self.read_epoch.load(Ordering::SeqCst) {
            warn!(epoch, "discarding stale page result");
            return false;
        }

        self.tx.send_modify(|s| {
            s.is_loading = false;
            match result {
                Ok(page) => {
                    s.total_pages = page.total_pages;
                    s.page = Some(page);
                    s.error = None;
                }
                Err(message) => {
                    s.page = None;
                    s.error = Some(message);
                }
            }
        });
        true
    }

    // ── Cursor navigation ────────────────────────────────────────────

    /// Advance the cursor, clamped to `total_pages - 1` using the
    /// *latest known* total — not a value captured before the current
    /// fetch — so a shrunken collection can't drive an out-of-range
    /// request. Returns whether the index actually moved.
    pub(crate) fn advance(&self) -> bool {
        let mut moved = false;
        self.tx.send_modify(|s| {
            let last = s.total_pages.saturating_sub(1);
            let next = (s.page_index + 1).min(last);
            moved = next != s.page_index;
            s.page_index = next;
        });
        moved
    }

    /// Move the cursor back, clamped to page 0. Returns whether the
    /// index actually moved.
    pub(crate) fn retreat(&self) -> bool {
        let mut moved = false;
        self.tx.send_modify(|s| {
            let prev = s.page_index.saturating_sub(1);
            moved = prev != s.page_index;
            s.page_index = prev;
        });
        moved
    }

    /// Reset the cursor to page 0 — page indices are not comparable
    /// across scopes.
    pub(crate) fn reset_index(&self) {
        self.tx.send_modify(|s| s.page_index = 0);
    }

    pub(crate) fn page_index(&self) -> u32 {
        self.tx.borrow().page_index
    }

    // ── Observation ──────────────────────────────────────────────────

    pub(crate) fn snapshot(&self) -> PageState<T> {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<PageState<T>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use watchly_api::types::Pageable;

    fn page_of(total_pages: u32, page_number: u32) -> Page<u32> {
        Page {
            content: Vec::new(),
            pageable: Pageable {
                page_number,
                page_size: 20,
            },
            total_pages,
            total_elements: u64::from(total_pages) * 20,
        }
    }

    #[test]
    fn advance_clamps_to_last_page() {
        let core: FeedCore<u32> = FeedCore::new();
        let epoch = core.begin_read();
        core.complete_read(epoch, Ok(page_of(5, 0)));

        for _ in 0..10 {
            core.advance();
        }
        assert_eq!(core.page_index(), 4);
        assert!(!core.advance());
    }

    #[test]
    fn retreat_clamps_to_zero() {
        let core: FeedCore<u32> = FeedCore::new();
        assert!(!core.retreat());
        assert_eq!(core.page_index(), 0);
    }

    #[test]
    fn advance_uses_latest_total_pages() {
        let core: FeedCore<u32> = FeedCore::new();
        let epoch = core.begin_read();
        core.complete_read(epoch, Ok(page_of(5, 0)));

        core.advance();
        core.advance();
        assert_eq!(core.page_index(), 2);

        // Collection shrank server-side: a fresh fetch reports 2 pages.
        let epoch = core.begin_read();
        core.complete_read(epoch, Ok(page_of(2, 2)));

        // The clamp must see the new total, not the stale 5: advancing
        // from the now out-of-range index 2 lands on the new last page.
        assert!(core.advance());
        assert_eq!(core.page_index(), 1);
    }

    #[test]
    fn failure_discards_previous_page() {
        let core: FeedCore<u32> = FeedCore::new();
        let epoch = core.begin_read();
        core.complete_read(epoch, Ok(page_of(3, 0)));
        assert!(core.snapshot().page.is_some());

        let epoch = core.begin_read();
        core.complete_read(epoch, Err("backend unavailable".into()));

        let snap = core.snapshot();
        assert!(snap.page.is_none());
        assert_eq!(snap.error.as_deref(), Some("backend unavailable"));
    }

    #[test]
    fn stale_page_is_discarded() {
        let core: FeedCore<u32> = FeedCore::new();
        let old = core.begin_read();
        let new = core.begin_read();

        assert!(core.complete_read(new, Ok(page_of(4, 1))));
        assert!(!core.complete_read(old, Ok(page_of(9, 0))));
        assert_eq!(core.snapshot().total_pages, 4);
    }
}
