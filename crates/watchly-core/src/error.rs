// ── Core error types ──
//
// User-facing errors from watchly-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<watchly_api::Error>`
// impl translates transport-layer errors into domain-appropriate
// variants, and component state stores the rendered message string.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    /// An operation needed a token and none is held. Fatal to the
    /// current session.
    #[error("Authentication token missing.")]
    AuthenticationRequired,

    /// Login or registration rejected by the backend.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: i64 },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("{message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Persistence errors ───────────────────────────────────────────
    /// Durable token storage failed (filesystem or keyring).
    #[error("Token storage error: {message}")]
    Storage { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The plain string surfaced to presentation layers. No structured
    /// error codes are exposed at this boundary.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    /// Returns `true` if the error means the session credential is gone
    /// and the session store should log out.
    pub fn is_auth_missing(&self) -> bool {
        matches!(self, Self::AuthenticationRequired)
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<watchly_api::Error> for CoreError {
    fn from(err: watchly_api::Error) -> Self {
        match err {
            watchly_api::Error::TokenMissing => CoreError::AuthenticationRequired,
            watchly_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            watchly_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            watchly_api::Error::Transport(ref e) => CoreError::Api {
                message: e.to_string(),
                status: e.status().map(|s| s.as_u16()),
            },
            watchly_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            watchly_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS error: {msg}"),
            },
            watchly_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_missing_translates_to_auth_required() {
        let core: CoreError = watchly_api::Error::TokenMissing.into();
        assert!(core.is_auth_missing());
        assert_eq!(core.user_message(), "Authentication token missing.");
    }

    #[test]
    fn api_message_passes_through_verbatim() {
        let core: CoreError = watchly_api::Error::Api {
            status: 400,
            message: "Invalid interval".into(),
        }
        .into();
        assert_eq!(core.user_message(), "Invalid interval");
    }
}
