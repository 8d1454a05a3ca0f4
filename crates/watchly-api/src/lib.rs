// watchly-api: Async Rust client for the watchdog uptime-monitoring REST API

pub mod client;
pub mod error;
pub mod transport;
pub mod types;

pub use client::ApiClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
