// ── Generic reactive collection state ──
//
// Shared machinery for the resource collections: a snapshot list plus
// independent read/write status pairs, broadcast via `watch` channels.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::warn;

/// Observable state of a resource collection.
///
/// The read pair (`is_loading`, `error`) and the write pair
/// (`is_mutating`, `mutation_error`) are tracked independently so a
/// failed mutation never erases previously loaded data and a failed
/// refresh never masks a mutation's own error.
#[derive(Debug, Clone)]
pub struct CollectionState<T> {
    pub items: Arc<Vec<T>>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub is_mutating: bool,
    pub mutation_error: Option<String>,
}

impl<T> Default for CollectionState<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
            is_loading: false,
            error: None,
            is_mutating: false,
            mutation_error: None,
        }
    }
}

/// Reactive holder for a [`CollectionState`], with epoch-stamped reads.
///
/// Every read fetch takes a monotonically increasing epoch; a completion
/// whose epoch is no longer current is discarded, so the most recently
/// *initiated* fetch always wins regardless of response ordering.
/// Mutation results are never epoch-discarded — they apply to identified
/// entities, not the whole snapshot.
pub(crate) struct SyncState<T: Clone + Send + Sync + 'static> {
    tx: watch::Sender<CollectionState<T>>,
    read_epoch: AtomicU64,
}

impl<T: Clone + Send + Sync + 'static> SyncState<T> {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(CollectionState::default());
        Self {
            tx,
            read_epoch: AtomicU64::new(0),
        }
    }

    // ── Read path ────────────────────────────────────────────────────

    /// Mark a read as started and return its epoch.
    pub(crate) fn begin_read(&self) -> u64 {
        let epoch = self.read_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        self.tx.send_modify(|s| {
            s.is_loading = true;
            s.error = None;
        });
        epoch
    }

    /// Apply a read completion. Returns `false` when the result was
    /// discarded because a newer read has been initiated since.
    pub(crate) fn complete_read(&self, epoch: u64, result: Result<Vec<T>, String>) -> bool {
        if epoch != self.read_epoch.load(Ordering::SeqCst) {
            warn!(epoch, "discarding stale read result");
            return false;
        }

        self.tx.send_modify(|s| {
            s.is_loading = false;
            match result {
                Ok(items) => {
                    s.items = Arc::new(items);
                    s.error = None;
                }
                Err(message) => {
                    // Stale data is worse than no data: discard the
                    // previous snapshot along with surfacing the error.
                    s.items = Arc::new(Vec::new());
                    s.error = Some(message);
                }
            }
        });
        true
    }

    /// Record a read error without touching the snapshot — used by
    /// scoped reads (`fetch_by_id`) that do not own the collection.
    pub(crate) fn note_read_error(&self, message: String) {
        self.tx.send_modify(|s| s.error = Some(message));
    }

    // ── Write path ───────────────────────────────────────────────────

    pub(crate) fn begin_mutation(&self) {
        self.tx.send_modify(|s| {
            s.is_mutating = true;
            s.mutation_error = None;
        });
    }

    /// Apply a successful mutation to the snapshot.
    pub(crate) fn complete_mutation_ok(&self, apply: impl FnOnce(&mut Vec<T>)) {
        self.tx.send_modify(|s| {
            let mut items = (*s.items).clone();
            apply(&mut items);
            s.items = Arc::new(items);
            s.is_mutating = false;
        });
    }

    pub(crate) fn complete_mutation_err(&self, message: String) {
        self.tx.send_modify(|s| {
            s.is_mutating = false;
            s.mutation_error = Some(message);
        });
    }

    /// Record a mutation rejected before it started (no token).
    pub(crate) fn reject_mutation(&self, message: String) {
        self.tx.send_modify(|s| s.mutation_error = Some(message));
    }

    // ── Observation ──────────────────────────────────────────────────

    pub(crate) fn snapshot(&self) -> CollectionState<T> {
        self.tx.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<CollectionState<T>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn read_replaces_snapshot() {
        let state: SyncState<String> = SyncState::new();
        let epoch = state.begin_read();
        assert!(state.snapshot().is_loading);

        assert!(state.complete_read(epoch, Ok(vec!["a".into(), "b".into()])));
        let snap = state.snapshot();
        assert!(!snap.is_loading);
        assert_eq!(snap.items.len(), 2);
        assert!(snap.error.is_none());
    }

    #[test]
    fn read_failure_clears_snapshot() {
        let state: SyncState<String> = SyncState::new();
        let epoch = state.begin_read();
        state.complete_read(epoch, Ok(vec!["a".into()]));

        let epoch = state.begin_read();
        assert!(state.complete_read(epoch, Err("boom".into())));

        let snap = state.snapshot();
        assert!(snap.items.is_empty());
        assert_eq!(snap.error.as_deref(), Some("boom"));
    }

    #[test]
    fn stale_read_is_discarded() {
        let state: SyncState<String> = SyncState::new();
        let old = state.begin_read();
        let new = state.begin_read();

        // The slower, older fetch completes after the newer one.
        assert!(state.complete_read(new, Ok(vec!["fresh".into()])));
        assert!(!state.complete_read(old, Ok(vec!["stale".into()])));

        assert_eq!(state.snapshot().items.as_slice(), ["fresh".to_owned()]);
    }

    #[test]
    fn mutation_error_keeps_read_snapshot() {
        let state: SyncState<String> = SyncState::new();
        let epoch = state.begin_read();
        state.complete_read(epoch, Ok(vec!["a".into()]));

        state.begin_mutation();
        state.complete_mutation_err("denied".into());

        let snap = state.snapshot();
        assert_eq!(snap.items.len(), 1);
        assert!(snap.error.is_none());
        assert_eq!(snap.mutation_error.as_deref(), Some("denied"));
        assert!(!snap.is_mutating);
    }

    #[test]
    fn mutation_applies_to_snapshot() {
        let state: SyncState<String> = SyncState::new();
        let epoch = state.begin_read();
        state.complete_read(epoch, Ok(vec!["a".into(), "b".into()]));

        state.begin_mutation();
        state.complete_mutation_ok(|items| items.retain(|i| i != "a"));

        assert_eq!(state.snapshot().items.as_slice(), ["b".to_owned()]);
    }
}
