// Hand-crafted async HTTP client for the watchdog REST API.
//
// Auth: `Authorization: Bearer <token>` on every endpoint except
// /auth/login and /auth/register. The token is passed per call because
// it is owned by the session layer and changes at runtime.

use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{
    AlertConfiguration, AlertHistoryEntry, AuthenticationResponse, CreateAlertConfigRequest,
    CreateMonitorRequest, LoginRequest, Monitor, MonitorCheck, Page, PageQuery,
    RegistrationRequest,
};

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the watchdog REST API.
///
/// Stateless with respect to authentication: callers supply the bearer
/// token on each authenticated request.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client` (used by tests).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Parse the base URL and guarantee a trailing slash so that
    /// joining relative paths never clobbers a path prefix.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        url.set_path(&format!("{path}/"));
        Ok(url)
    }

    /// Join a relative path (e.g. `"monitors/3/alerts"`) onto the base URL.
    fn url(&self, path: &str) -> Url {
        // base_url always ends with `/`, so joining relative paths works.
        self.base_url
            .join(path)
            .expect("path should be valid relative URL")
    }

    fn bearer(token: &SecretString) -> Result<HeaderValue, Error> {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Authentication {
                message: format!("invalid token header value: {e}"),
            })?;
        value.set_sensitive(true);
        Ok(value)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(
        &self,
        token: &SecretString,
        path: &str,
        fallback: &str,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, Self::bearer(token)?)
            .send()
            .await?;
        self.handle_response(resp, fallback).await
    }

    async fn get_with_params<T: DeserializeOwned>(
        &self,
        token: &SecretString,
        path: &str,
        params: &[(&str, String)],
        fallback: &str,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("GET {url} params={params:?}");

        let resp = self
            .http
            .get(url)
            .query(params)
            .header(reqwest::header::AUTHORIZATION, Self::bearer(token)?)
            .send()
            .await?;
        self.handle_response(resp, fallback).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        token: &SecretString,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("POST {url}");

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, Self::bearer(token)?)
            .json(body)
            .send()
            .await?;
        self.handle_response(resp, fallback).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        token: &SecretString,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("PUT {url}");

        let resp = self
            .http
            .put(url)
            .header(reqwest::header::AUTHORIZATION, Self::bearer(token)?)
            .json(body)
            .send()
            .await?;
        self.handle_response(resp, fallback).await
    }

    async fn delete(
        &self,
        token: &SecretString,
        path: &str,
        fallback: &str,
    ) -> Result<(), Error> {
        let url = self.url(path);
        debug!("DELETE {url}");

        let resp = self
            .http
            .delete(url)
            .header(reqwest::header::AUTHORIZATION, Self::bearer(token)?)
            .send()
            .await?;
        self.handle_empty(resp, fallback).await
    }

    /// POST without a bearer token — auth endpoints only.
    async fn post_unauthenticated<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<T, Error> {
        let url = self.url(path);
        debug!("POST {url} (unauthenticated)");

        let resp = self.http.post(url).json(body).send().await?;

        let status = resp.status();
        if status.is_success() {
            return self.decode(resp).await;
        }

        // Login/register rejections carry the same `{message}` body but
        // map to the Authentication variant, not Api.
        let message = Self::error_message(resp, fallback).await;
        Err(Error::Authentication { message })
    }

    // ── Response handling ────────────────────────────────────────────

    async fn decode<T: DeserializeOwned>(&self, resp: reqwest::Response) -> Result<T, Error> {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = &body[..body.len().min(200)];
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
        fallback: &str,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            self.decode(resp).await
        } else {
            Err(self.parse_error(status, resp, fallback).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response, fallback: &str) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp, fallback).await)
        }
    }

    async fn parse_error(
        &self,
        status: reqwest::StatusCode,
        resp: reqwest::Response,
        fallback: &str,
    ) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            // The token was rejected: the session is no longer valid.
            return Error::TokenMissing;
        }

        let message = Self::error_message(resp, fallback).await;
        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    /// Extract the backend's `{message}` verbatim, or the per-operation
    /// fallback when absent or unparsable.
    async fn error_message(resp: reqwest::Response, fallback: &str) -> String {
        let raw = resp.text().await.unwrap_or_default();
        serde_json::from_str::<ErrorBody>(&raw)
            .ok()
            .and_then(|b| b.message)
            .unwrap_or_else(|| fallback.to_owned())
    }

    // ━━ Public API ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    // ── Authentication ───────────────────────────────────────────────

    pub async fn login(&self, credentials: &LoginRequest) -> Result<AuthenticationResponse, Error> {
        self.post_unauthenticated("auth/login", credentials, "Login failed")
            .await
    }

    pub async fn register(
        &self,
        new_user: &RegistrationRequest,
    ) -> Result<AuthenticationResponse, Error> {
        self.post_unauthenticated("auth/register", new_user, "Registration failed")
            .await
    }

    // ── Monitors ─────────────────────────────────────────────────────

    pub async fn list_monitors(&self, token: &SecretString) -> Result<Vec<Monitor>, Error> {
        self.get(token, "monitors", "Failed to fetch monitors").await
    }

    pub async fn get_monitor(&self, token: &SecretString, id: i64) -> Result<Monitor, Error> {
        self.get(token, &format!("monitors/{id}"), "Failed to fetch monitor by id")
            .await
    }

    pub async fn create_monitor(
        &self,
        token: &SecretString,
        body: &CreateMonitorRequest,
    ) -> Result<Monitor, Error> {
        self.post(token, "monitors", body, "Failed to create monitor")
            .await
    }

    pub async fn update_monitor(
        &self,
        token: &SecretString,
        id: i64,
        body: &CreateMonitorRequest,
    ) -> Result<Monitor, Error> {
        self.put(token, &format!("monitors/{id}"), body, "Failed to update monitor")
            .await
    }

    pub async fn delete_monitor(&self, token: &SecretString, id: i64) -> Result<(), Error> {
        self.delete(token, &format!("monitors/{id}"), "Failed to delete monitor")
            .await
    }

    // ── Alert configurations ─────────────────────────────────────────

    pub async fn list_alert_configs(
        &self,
        token: &SecretString,
        monitor_id: i64,
    ) -> Result<Vec<AlertConfiguration>, Error> {
        self.get(
            token,
            &format!("monitors/{monitor_id}/alerts"),
            "Failed to fetch alert configurations",
        )
        .await
    }

    pub async fn create_alert_config(
        &self,
        token: &SecretString,
        monitor_id: i64,
        body: &CreateAlertConfigRequest,
    ) -> Result<AlertConfiguration, Error> {
        self.post(
            token,
            &format!("monitors/{monitor_id}/alerts"),
            body,
            "Failed to create alert configuration",
        )
        .await
    }

    pub async fn update_alert_config(
        &self,
        token: &SecretString,
        monitor_id: i64,
        config_id: i64,
        body: &CreateAlertConfigRequest,
    ) -> Result<AlertConfiguration, Error> {
        self.put(
            token,
            &format!("monitors/{monitor_id}/alerts/{config_id}"),
            body,
            "Failed to update alert configuration",
        )
        .await
    }

    pub async fn delete_alert_config(
        &self,
        token: &SecretString,
        monitor_id: i64,
        config_id: i64,
    ) -> Result<(), Error> {
        self.delete(
            token,
            &format!("monitors/{monitor_id}/alerts/{config_id}"),
            "Failed to delete alert configuration",
        )
        .await
    }

    // ── Alert history (read-only, paginated) ─────────────────────────

    pub async fn alert_history_for_monitor(
        &self,
        token: &SecretString,
        monitor_id: i64,
        query: PageQuery,
    ) -> Result<Page<AlertHistoryEntry>, Error> {
        self.get_with_params(
            token,
            &format!("monitors/{monitor_id}/history/alerts"),
            &query.to_params(),
            "Failed to fetch alert history",
        )
        .await
    }

    pub async fn alert_history(
        &self,
        token: &SecretString,
        query: PageQuery,
    ) -> Result<Page<AlertHistoryEntry>, Error> {
        self.get_with_params(
            token,
            "alerts/history/",
            &query.to_params(),
            "Failed to fetch alert history",
        )
        .await
    }

    // ── Monitor checks (read-only, paginated) ────────────────────────

    pub async fn checks_for_monitor(
        &self,
        token: &SecretString,
        monitor_id: i64,
        query: PageQuery,
    ) -> Result<Page<MonitorCheck>, Error> {
        self.get_with_params(
            token,
            &format!("monitors/{monitor_id}/checks"),
            &query.to_params(),
            "Failed to fetch monitor checks",
        )
        .await
    }

    pub async fn all_checks(
        &self,
        token: &SecretString,
        query: PageQuery,
    ) -> Result<Page<MonitorCheck>, Error> {
        self.get_with_params(
            token,
            "checks/all",
            &query.to_params(),
            "Failed to fetch monitor checks",
        )
        .await
    }
}
