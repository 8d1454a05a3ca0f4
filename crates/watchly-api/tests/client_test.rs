#![allow(clippy::unwrap_used)]
// Integration tests for `ApiClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use watchly_api::types::{
    AlertType, CreateAlertConfigRequest, CreateMonitorRequest, InitialAlertConfig,
    InitialAlertType, LoginRequest, MonitorStatus, MonitorType, PageQuery,
};
use watchly_api::{ApiClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let client = ApiClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

fn token(value: &str) -> SecretString {
    SecretString::from(value.to_owned())
}

fn monitor_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "userId": 1,
        "url": "https://a.com",
        "checkIntervalSeconds": 60,
        "type": "HTTP_HTTPS",
        "status": "UP",
        "lastCheckedAt": "2025-05-01T12:00:00",
        "lastStatusChangeAt": "2025-05-01T11:00:00",
        "createdAt": "2025-04-01T00:00:00"
    })
}

// ── Authentication tests ────────────────────────────────────────────

#[tokio::test]
async fn test_login_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "u@x.com", "password": "secret1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "jwt-1"})))
        .mount(&server)
        .await;

    let resp = client
        .login(&LoginRequest {
            email: "u@x.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();

    assert_eq!(resp.token, "jwt-1");
}

#[tokio::test]
async fn test_login_failure_surfaces_backend_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
        )
        .mount(&server)
        .await;

    let result = client
        .login(&LoginRequest {
            email: "u@x.com".into(),
            password: "wrong".into(),
        })
        .await;

    match result {
        Err(Error::Authentication { ref message }) => assert_eq!(message, "Bad credentials"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_failure_falls_back_without_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let result = client
        .login(&LoginRequest {
            email: "u@x.com".into(),
            password: "secret1".into(),
        })
        .await;

    match result {
        Err(Error::Authentication { ref message }) => assert_eq!(message, "Login failed"),
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_register_success() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "jwt-new"})))
        .mount(&server)
        .await;

    let resp = client
        .register(&watchly_api::types::RegistrationRequest {
            email: "new@x.com".into(),
            password: "secret1".into(),
        })
        .await
        .unwrap();

    assert_eq!(resp.token, "jwt-new");
}

// ── Monitor tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_monitors_sends_bearer_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/monitors"))
        .and(header("Authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([monitor_json(1)])))
        .mount(&server)
        .await;

    let monitors = client.list_monitors(&token("jwt-1")).await.unwrap();

    assert_eq!(monitors.len(), 1);
    assert_eq!(monitors[0].id, 1);
    assert_eq!(monitors[0].status, MonitorStatus::Up);
    assert_eq!(monitors[0].monitor_type, MonitorType::HttpHttps);
}

#[tokio::test]
async fn test_create_monitor_returns_entity() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/monitors"))
        .and(header("Authorization", "Bearer jwt-1"))
        .respond_with(ResponseTemplate::new(201).set_body_json(monitor_json(7)))
        .mount(&server)
        .await;

    let created = client
        .create_monitor(
            &token("jwt-1"),
            &CreateMonitorRequest {
                url: "https://a.com".into(),
                check_interval_seconds: 60,
                monitor_type: MonitorType::HttpHttps,
                alert_config: InitialAlertConfig {
                    alert_type: InitialAlertType::Email,
                    destination: "ops@a.com".into(),
                },
            },
        )
        .await
        .unwrap();

    assert_eq!(created.id, 7);
}

#[tokio::test]
async fn test_delete_monitor_empty_body() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/monitors/7"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    client.delete_monitor(&token("jwt-1"), 7).await.unwrap();
}

#[tokio::test]
async fn test_api_error_message_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/monitors"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid interval"})),
        )
        .mount(&server)
        .await;

    let result = client.list_monitors(&token("jwt-1")).await;

    match result {
        Err(Error::Api {
            status: 400,
            ref message,
        }) => assert_eq!(message, "Invalid interval"),
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_rejected_token_maps_to_token_missing() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/monitors"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_monitors(&token("stale")).await;

    assert!(
        matches!(result, Err(Error::TokenMissing)),
        "expected TokenMissing, got: {result:?}"
    );
}

// ── Alert configuration tests ───────────────────────────────────────

#[tokio::test]
async fn test_alert_config_crud_paths() {
    let (server, client) = setup().await;

    let config = json!({
        "id": 4,
        "monitorId": 7,
        "type": "DISCORD_WEBHOOK",
        "destination": "https://discord.example/hook",
        "enabled": true,
        "failureThreshold": 3,
        "recoveryThreshold": 2,
        "createdAt": "2025-05-01T00:00:00",
        "updatedAt": "2025-05-01T00:00:00"
    });

    Mock::given(method("GET"))
        .and(path("/monitors/7/alerts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([config])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/monitors/7/alerts/4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&config))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/monitors/7/alerts/4"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let t = token("jwt-1");
    let configs = client.list_alert_configs(&t, 7).await.unwrap();
    assert_eq!(configs.len(), 1);
    assert_eq!(configs[0].alert_type, AlertType::DiscordWebhook);

    let update = CreateAlertConfigRequest {
        alert_type: AlertType::DiscordWebhook,
        destination: "https://discord.example/hook".into(),
        enabled: true,
        failure_threshold: 3,
        recovery_threshold: 2,
    };
    let updated = client.update_alert_config(&t, 7, 4, &update).await.unwrap();
    assert_eq!(updated.id, 4);

    client.delete_alert_config(&t, 7, 4).await.unwrap();
}

// ── Paginated endpoint tests ────────────────────────────────────────

#[tokio::test]
async fn test_alert_history_page_and_params() {
    let (server, client) = setup().await;

    let page = json!({
        "content": [{
            "id": 11,
            "monitorId": 7,
            "alertConfigurationId": 4,
            "timestamp": "2025-05-01T12:00:00",
            "status": "SENT",
            "message": "monitor down"
        }],
        "pageable": { "pageNumber": 1, "pageSize": 20 },
        "totalPages": 3,
        "totalElements": 42
    });

    Mock::given(method("GET"))
        .and(path("/monitors/7/history/alerts"))
        .and(query_param("page", "1"))
        .and(query_param("size", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page))
        .mount(&server)
        .await;

    let result = client
        .alert_history_for_monitor(&token("jwt-1"), 7, PageQuery::page(1))
        .await
        .unwrap();

    assert_eq!(result.pageable.page_number, 1);
    assert_eq!(result.total_pages, 3);
    assert_eq!(result.content[0].monitor_id, 7);
}

#[tokio::test]
async fn test_global_checks_with_time_window() {
    let (server, client) = setup().await;

    let page = json!({
        "content": [],
        "pageable": { "pageNumber": 0, "pageSize": 20 },
        "totalPages": 0,
        "totalElements": 0
    });

    Mock::given(method("GET"))
        .and(path("/checks/all"))
        .and(query_param("page", "0"))
        .and(query_param("startTime", "2025-05-01T00:00:00"))
        .and(query_param("endTime", "2025-05-02T00:00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page))
        .mount(&server)
        .await;

    let start = chrono::NaiveDateTime::parse_from_str("2025-05-01T00:00:00", "%Y-%m-%dT%H:%M:%S")
        .unwrap();
    let end = chrono::NaiveDateTime::parse_from_str("2025-05-02T00:00:00", "%Y-%m-%dT%H:%M:%S")
        .unwrap();

    let result = client
        .all_checks(&token("jwt-1"), PageQuery::page(0).with_window(start, end))
        .await
        .unwrap();

    assert!(result.content.is_empty());
    assert_eq!(result.total_pages, 0);
}
