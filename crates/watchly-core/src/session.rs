// ── Session lifecycle ──
//
// Single source of truth for "may this client call the backend, and
// with what credential". The bearer token is owned here exclusively;
// collections and feeds read it, never write it.

use std::path::PathBuf;
use std::sync::Arc;

use secrecy::SecretString;
use tokio::sync::watch;
use tracing::{debug, warn};

use watchly_api::ApiClient;
use watchly_api::types::{AuthenticationResponse, LoginRequest, RegistrationRequest};

use crate::error::CoreError;

// ── Session snapshot ─────────────────────────────────────────────────

/// Point-in-time view of the session.
///
/// `is_authenticated == token.is_some()` always holds: the only way to
/// build a `Session` is through the constructors below, so the token and
/// the flag change atomically.
#[derive(Debug, Clone)]
pub struct Session {
    token: Option<SecretString>,
    is_authenticated: bool,
    is_loading: bool,
}

impl Session {
    fn authenticated(token: SecretString) -> Self {
        Self {
            token: Some(token),
            is_authenticated: true,
            is_loading: false,
        }
    }

    fn anonymous() -> Self {
        Self {
            token: None,
            is_authenticated: false,
            is_loading: false,
        }
    }

    pub fn token(&self) -> Option<&SecretString> {
        self.token.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }
}

// ── Durable token storage ────────────────────────────────────────────

/// Persisted storage for exactly one value: the bearer token.
///
/// Written on successful login/register, removed on logout or on any
/// authentication failure. Implementations must be cheap enough to call
/// synchronously from the session store.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Result<Option<String>, CoreError>;
    fn save(&self, token: &str) -> Result<(), CoreError>;
    fn clear(&self) -> Result<(), CoreError>;
}

/// Token-at-rest in a single file under a well-known path
/// (see `watchly-config`'s `token_path()`).
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<String>, CoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => {
                let token = raw.trim();
                if token.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(token.to_owned()))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CoreError::Storage {
                message: format!("failed to read token file: {e}"),
            }),
        }
    }

    fn save(&self, token: &str) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| CoreError::Storage {
                message: format!("failed to create token directory: {e}"),
            })?;
        }
        std::fs::write(&self.path, token).map_err(|e| CoreError::Storage {
            message: format!("failed to write token file: {e}"),
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.path, perms).map_err(|e| CoreError::Storage {
                message: format!("failed to restrict token file permissions: {e}"),
            })?;
        }

        Ok(())
    }

    fn clear(&self) -> Result<(), CoreError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::Storage {
                message: format!("failed to remove token file: {e}"),
            }),
        }
    }
}

/// Token-at-rest in the OS keyring, under the `watchly/auth-token` entry.
pub struct KeyringTokenStore {
    service: String,
    entry: String,
}

impl KeyringTokenStore {
    pub fn new() -> Self {
        Self {
            service: "watchly".to_owned(),
            entry: "auth-token".to_owned(),
        }
    }

    fn keyring_entry(&self) -> Result<keyring::Entry, CoreError> {
        keyring::Entry::new(&self.service, &self.entry).map_err(|e| CoreError::Storage {
            message: format!("keyring unavailable: {e}"),
        })
    }
}

impl Default for KeyringTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self) -> Result<Option<String>, CoreError> {
        match self.keyring_entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CoreError::Storage {
                message: format!("keyring read failed: {e}"),
            }),
        }
    }

    fn save(&self, token: &str) -> Result<(), CoreError> {
        self.keyring_entry()?
            .set_password(token)
            .map_err(|e| CoreError::Storage {
                message: format!("keyring write failed: {e}"),
            })
    }

    fn clear(&self) -> Result<(), CoreError> {
        match self.keyring_entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CoreError::Storage {
                message: format!("keyring delete failed: {e}"),
            }),
        }
    }
}

// ── SessionStore ─────────────────────────────────────────────────────

/// Owns the authentication token, its persistence, and the derived
/// authentication status.
///
/// Lifecycle: `new()` hydrates once from the [`TokenStore`] and lands in
/// either the authenticated or the anonymous state. Afterwards
/// `is_loading` is true only while a login/register call is in flight.
/// Login and registration failures discard any prior session rather than
/// leaving it stale (fail closed).
pub struct SessionStore {
    api: Arc<ApiClient>,
    storage: Box<dyn TokenStore>,
    state: watch::Sender<Session>,
}

impl SessionStore {
    /// Build the store and hydrate from persisted storage.
    ///
    /// A storage read failure degrades to the anonymous state with a
    /// warning — an unreadable token file should not brick the client.
    pub fn new(api: Arc<ApiClient>, storage: Box<dyn TokenStore>) -> Self {
        let initial = match storage.load() {
            Ok(Some(token)) => {
                debug!("session hydrated from persisted token");
                Session::authenticated(SecretString::from(token))
            }
            Ok(None) => Session::anonymous(),
            Err(e) => {
                warn!(error = %e, "token hydration failed, starting anonymous");
                Session::anonymous()
            }
        };

        let (state, _) = watch::channel(initial);
        Self { api, storage, state }
    }

    /// Access the shared API client.
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    // ── Operations ───────────────────────────────────────────────────

    /// Authenticate with the backend and persist the returned token.
    ///
    /// On failure the persisted token (if any) is cleared and the session
    /// transitions to anonymous before the error is returned, so an
    /// invalid credential attempt logs the user out of any prior session.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<(), CoreError> {
        self.state.send_modify(|s| s.is_loading = true);

        match self.api.login(credentials).await {
            Ok(AuthenticationResponse { token }) => self.establish(token),
            Err(e) => self.fail_closed(e.into()),
        }
    }

    /// Create an account; identical contract to [`login`](Self::login).
    pub async fn register(&self, new_user: &RegistrationRequest) -> Result<(), CoreError> {
        self.state.send_modify(|s| s.is_loading = true);

        match self.api.register(new_user).await {
            Ok(AuthenticationResponse { token }) => self.establish(token),
            Err(e) => self.fail_closed(e.into()),
        }
    }

    /// End the session immediately: clears the persisted token and the
    /// in-memory copy in one transition. No network call.
    pub fn logout(&self) {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "failed to clear persisted token on logout");
        }
        self.state.send_replace(Session::anonymous());
        debug!("session ended");
    }

    /// The current token, or `None` when anonymous. Pure read.
    pub fn token(&self) -> Option<SecretString> {
        debug!("retrieving session token");
        self.state.borrow().token.clone()
    }

    // ── State observation ────────────────────────────────────────────

    /// Snapshot of the current session.
    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    // ── Private helpers ──────────────────────────────────────────────

    fn establish(&self, token: String) -> Result<(), CoreError> {
        // Persist before exposing: a session the next process can't
        // hydrate is worse than a failed login.
        if let Err(e) = self.storage.save(&token) {
            return self.fail_closed(e);
        }
        self.state
            .send_replace(Session::authenticated(SecretString::from(token)));
        debug!("session established");
        Ok(())
    }

    fn fail_closed(&self, err: CoreError) -> Result<(), CoreError> {
        if let Err(e) = self.storage.clear() {
            warn!(error = %e, "failed to clear persisted token after auth failure");
        }
        self.state.send_replace(Session::anonymous());
        Err(err)
    }
}
