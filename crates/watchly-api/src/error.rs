use thiserror::Error;

/// Top-level error type for the `watchly-api` crate.
///
/// Covers every failure mode of the transport layer: missing credential,
/// rejected login, HTTP transport, backend-reported errors, and response
/// decoding. `watchly-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// An authenticated call was attempted with no bearer token.
    ///
    /// Raised locally, before any network I/O, and also produced when the
    /// backend answers 401 — in both cases the session is no longer valid.
    #[error("Authentication token missing")]
    TokenMissing,

    /// Login or registration rejected by the backend.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Backend ─────────────────────────────────────────────────────
    /// Non-2xx response with the backend's `{message}` body (or a
    /// per-operation fallback when the body carries none).
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this error means the current session credential
    /// is absent or no longer accepted, i.e. the session should end.
    pub fn is_auth_missing(&self) -> bool {
        matches!(self, Self::TokenMissing)
    }

    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            Self::Api { status: 404, .. } => true,
            _ => false,
        }
    }

    /// The message a user should see, without the variant prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::TokenMissing => "Authentication token missing.".to_owned(),
            Self::Authentication { message } | Self::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
