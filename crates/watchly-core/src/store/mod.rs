// ── Resource synchronization ──
//
// One component per remote resource kind, each owning its snapshot
// exclusively. Collections (monitors, alert configs) hold the full list
// and support writes; feeds (alert history, checks) hold one read-only
// page with cursor navigation.

mod alert_configs;
mod alert_history;
mod checks;
mod feed;
mod monitors;
mod state;

pub use alert_configs::AlertConfigCollection;
pub use alert_history::AlertHistoryFeed;
pub use checks::CheckFeed;
pub use feed::PageState;
pub use monitors::MonitorCollection;
pub use state::CollectionState;
