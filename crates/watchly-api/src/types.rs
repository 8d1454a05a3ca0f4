//! Wire types for the watchdog REST API.
//!
//! All types match the JSON bodies exchanged with the backend.
//! Field names use camelCase via `#[serde(rename_all = "camelCase")]`;
//! enum values arrive as SCREAMING_SNAKE_CASE strings. Timestamps are
//! ISO 8601 local date-times without a zone offset, so they map to
//! [`chrono::NaiveDateTime`].

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ── Authentication ───────────────────────────────────────────────────

/// Credentials for `POST /auth/login`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// New-account payload for `POST /auth/register`.
///
/// Same shape as [`LoginRequest`] today, kept separate because the two
/// endpoints evolve independently server-side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub email: String,
    pub password: String,
}

/// Success body of both auth endpoints: the bearer token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResponse {
    pub token: String,
}

// ── Pagination ───────────────────────────────────────────────────────

/// One slice of a server-side ordered collection (Spring Data page shape).
///
/// Invariant: `0 <= pageable.page_number < total_pages` whenever
/// `total_elements > 0`, and `content.len() <= pageable.page_size`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub pageable: Pageable,
    pub total_pages: u32,
    pub total_elements: u64,
}

/// Position metadata inside a [`Page`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pageable {
    pub page_number: u32,
    pub page_size: u32,
}

/// Query parameters accepted by every paginated endpoint.
///
/// `page` and `size` are always sent; the time window is appended only
/// when set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageQuery {
    pub page: u32,
    pub size: u32,
    pub start_time: Option<NaiveDateTime>,
    pub end_time: Option<NaiveDateTime>,
}

impl PageQuery {
    /// A query for the given page with the default page size (20).
    pub fn page(page: u32) -> Self {
        Self {
            page,
            size: 20,
            start_time: None,
            end_time: None,
        }
    }

    /// Restrict results to `[start, end]`.
    pub fn with_window(mut self, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        self.start_time = Some(start);
        self.end_time = Some(end);
        self
    }

    /// Render as query-string pairs in the order the backend documents them.
    pub(crate) fn to_params(self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
        ];
        if let Some(start) = self.start_time {
            params.push(("startTime", start.format("%Y-%m-%dT%H:%M:%S").to_string()));
        }
        if let Some(end) = self.end_time {
            params.push(("endTime", end.format("%Y-%m-%dT%H:%M:%S").to_string()));
        }
        params
    }
}

impl Default for PageQuery {
    fn default() -> Self {
        Self::page(0)
    }
}

// ── Monitors ─────────────────────────────────────────────────────────

/// Probe type of a monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitorType {
    HttpHttps,
    Ping,
    Port,
}

/// Current reachability state of a monitor, as judged by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MonitorStatus {
    Up,
    Down,
    Paused,
    Unknown,
}

/// A synthetic uptime check owned by the current user — from `GET /monitors`.
///
/// `last_checked_at`, `last_status_change_at`, and `updated_at` are absent
/// until the first check / first edit, so they parse as `None` rather than
/// defaulting to a sentinel date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monitor {
    pub id: i64,
    pub user_id: i64,
    pub url: String,
    pub check_interval_seconds: u32,
    #[serde(rename = "type")]
    pub monitor_type: MonitorType,
    pub status: MonitorStatus,
    #[serde(default)]
    pub last_checked_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub last_status_change_at: Option<NaiveDateTime>,
    /// Substring the response body must contain for the check to pass.
    #[serde(default)]
    pub content_match_string: Option<String>,
    #[serde(default)]
    pub http_method: Option<String>,
    /// Extra request headers, serialized as a JSON object string.
    #[serde(default)]
    pub http_headers: Option<String>,
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

/// Alert seed embedded in a monitor-creation payload.
///
/// The backend creates one alert configuration alongside the monitor;
/// only two channel kinds are accepted at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InitialAlertType {
    Email,
    Webhook,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialAlertConfig {
    pub alert_type: InitialAlertType,
    pub destination: String,
}

/// Create or update a monitor — body of `POST /monitors` and
/// `PUT /monitors/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMonitorRequest {
    pub url: String,
    pub check_interval_seconds: u32,
    #[serde(rename = "type")]
    pub monitor_type: MonitorType,
    pub alert_config: InitialAlertConfig,
}

// ── Alert configurations ─────────────────────────────────────────────

/// Delivery channel of an alert configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    Email,
    DiscordWebhook,
    Telegram,
    GenericWebhook,
}

/// An alert rule scoped to exactly one monitor — from
/// `GET /monitors/{id}/alerts`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertConfiguration {
    pub id: i64,
    pub monitor_id: i64,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    /// Email address or webhook URL, depending on `alert_type`.
    pub destination: String,
    pub enabled: bool,
    /// Consecutive failed checks before an alert fires.
    pub failure_threshold: u32,
    /// Consecutive successful checks before a recovery notice fires.
    pub recovery_threshold: u32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Create or update an alert configuration — body of
/// `POST /monitors/{id}/alerts` and `PUT /monitors/{id}/alerts/{cid}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAlertConfigRequest {
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub destination: String,
    pub enabled: bool,
    pub failure_threshold: u32,
    pub recovery_threshold: u32,
}

// ── Alert history ────────────────────────────────────────────────────

/// Outcome of one alert delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertDeliveryStatus {
    Sent,
    Failed,
    Throttled,
}

/// One append-only alert-delivery record — from the paginated
/// `/history/alerts` endpoints. Never mutated by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertHistoryEntry {
    pub id: i64,
    pub monitor_id: i64,
    pub alert_configuration_id: i64,
    pub timestamp: NaiveDateTime,
    pub status: AlertDeliveryStatus,
    pub message: String,
}

// ── Monitor checks ───────────────────────────────────────────────────

/// Failure classification of a single check execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    HttpClientError,
    HttpServerError,
    NetworkError,
    SslError,
    TimeoutError,
    ContentMismatch,
    UnknownError,
    None,
}

/// One executed check with its timing breakdown — from the paginated
/// `/checks` endpoints. Read-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorCheck {
    pub id: i64,
    pub monitor_id: i64,
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub http_status_code: Option<u16>,
    #[serde(default)]
    pub response_time_ms: Option<u64>,
    #[serde(default)]
    pub is_up: Option<bool>,
    #[serde(default)]
    pub error_message: Option<String>,
    pub error_category: ErrorCategory,
    pub dns_time_ms: u64,
    pub connect_time_ms: u64,
    pub ttfb_ms: u64,
    pub response_body_size: u64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn monitor_parses_backend_shape() {
        let body = json!({
            "id": 1,
            "userId": 9,
            "url": "https://a.com",
            "checkIntervalSeconds": 60,
            "type": "HTTP_HTTPS",
            "status": "UP",
            "lastCheckedAt": "2025-05-01T12:00:00",
            "lastStatusChangeAt": "2025-04-30T08:15:30",
            "createdAt": "2025-04-01T00:00:00",
            "httpMethod": "GET"
        });

        let monitor: Monitor = serde_json::from_value(body).unwrap();
        assert_eq!(monitor.monitor_type, MonitorType::HttpHttps);
        assert_eq!(monitor.status, MonitorStatus::Up);
        assert_eq!(monitor.http_method.as_deref(), Some("GET"));
        assert!(monitor.updated_at.is_none());
        assert!(monitor.content_match_string.is_none());
    }

    #[test]
    fn page_parses_spring_shape() {
        let body = json!({
            "content": [{
                "id": 3,
                "monitorId": 1,
                "alertConfigurationId": 2,
                "timestamp": "2025-05-01T12:00:00",
                "status": "THROTTLED",
                "message": "suppressed repeat alert"
            }],
            "pageable": { "pageNumber": 2, "pageSize": 20 },
            "totalPages": 5,
            "totalElements": 97
        });

        let page: Page<AlertHistoryEntry> = serde_json::from_value(body).unwrap();
        assert_eq!(page.pageable.page_number, 2);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.content.len(), 1);
        assert_eq!(page.content[0].status, AlertDeliveryStatus::Throttled);
    }

    #[test]
    fn page_query_window_params() {
        let start = NaiveDateTime::parse_from_str("2025-05-01T00:00:00", "%Y-%m-%dT%H:%M:%S")
            .unwrap();
        let end =
            NaiveDateTime::parse_from_str("2025-05-02T00:00:00", "%Y-%m-%dT%H:%M:%S").unwrap();

        let params = PageQuery::page(1).with_window(start, end).to_params();
        assert_eq!(
            params,
            vec![
                ("page", "1".to_owned()),
                ("size", "20".to_owned()),
                ("startTime", "2025-05-01T00:00:00".to_owned()),
                ("endTime", "2025-05-02T00:00:00".to_owned()),
            ]
        );
    }

    #[test]
    fn create_monitor_request_serializes_type_field() {
        let req = CreateMonitorRequest {
            url: "https://a.com".into(),
            check_interval_seconds: 30,
            monitor_type: MonitorType::Ping,
            alert_config: InitialAlertConfig {
                alert_type: InitialAlertType::Email,
                destination: "ops@a.com".into(),
            },
        };

        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["type"], "PING");
        assert_eq!(value["alertConfig"]["alertType"], "EMAIL");
    }
}
