//! Session & resource-synchronization layer between `watchly-api` and
//! UI consumers.
//!
//! This crate owns the client-side state machinery for the watchdog
//! uptime-monitoring service:
//!
//! - **[`SessionStore`]** — single source of truth for the bearer token:
//!   hydrates once from durable storage at startup, handles
//!   login/register/logout, and broadcasts [`Session`] snapshots. All
//!   other components read the token from here and never write it.
//!
//! - **Resource collections** — [`MonitorCollection`] and
//!   [`AlertConfigCollection`] keep a full in-memory list synchronized
//!   with the backend through fetch/mutate cycles. Read state and write
//!   state are tracked independently, so a failed mutation never clobbers
//!   loaded data. The two collections deliberately use different
//!   write-reconciliation policies: monitors merge the server's response
//!   into the snapshot (optimistic merge), alert configs refetch the
//!   whole list after every successful write.
//!
//! - **Paged feeds** — [`AlertHistoryFeed`] and [`CheckFeed`] expose one
//!   page at a time of the backend's read-only, paginated streams, with
//!   clamped cursor navigation and (for checks) runtime scope switching
//!   between one monitor and the whole account.
//!
//! - **[`StateStream`]** — subscription handle wrapping the `watch`
//!   receivers vended by every component's `subscribe()`.
//!
//! Reads are epoch-stamped: when overlapping fetches complete out of
//! order, only the most recently initiated one is applied.

pub mod error;
pub mod session;
pub mod store;
pub mod stream;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::CoreError;
pub use session::{FileTokenStore, KeyringTokenStore, Session, SessionStore, TokenStore};
pub use store::{
    AlertConfigCollection, AlertHistoryFeed, CheckFeed, CollectionState, MonitorCollection,
    PageState,
};
pub use stream::StateStream;

// Re-export the wire types at the crate root for ergonomics — the
// watchdog DTOs are already domain-shaped, so core does not duplicate
// them behind a conversion layer.
pub use watchly_api::types::{
    AlertConfiguration, AlertDeliveryStatus, AlertHistoryEntry, AlertType,
    CreateAlertConfigRequest, CreateMonitorRequest, ErrorCategory, InitialAlertConfig,
    InitialAlertType, LoginRequest, Monitor, MonitorCheck, MonitorStatus, MonitorType, Page,
    PageQuery, Pageable, RegistrationRequest,
};
