#![allow(clippy::unwrap_used)]
// End-to-end tests for `Panel` against a mocked panel.

use std::sync::Arc;

use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use url::Url;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hostdeck_core::listing::FLASH_SCOPE;
use hostdeck_core::{
    AuthCredentials, CoreError, EntityListController, Location, Notifications, Panel,
    PanelConfig, PreferenceStore, ServerStatus, TelemetrySource,
};

const UUID_A: &str = "1a7ce997-259b-452e-8b4e-cecc464142ca";

async fn mount_account(server: &MockServer, admin: bool) {
    Mock::given(method("GET"))
        .and(path("/api/client/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "user",
            "attributes": { "id": 7, "admin": admin, "username": "alice", "email": "a@example.com" }
        })))
        .mount(server)
        .await;
}

fn api_key_config(server: &MockServer) -> PanelConfig {
    PanelConfig::new(
        Url::parse(&server.uri()).unwrap(),
        AuthCredentials::ApiKey("ptlc_test".to_string().into()),
    )
}

fn session_config(server: &MockServer, totp: Option<&str>) -> PanelConfig {
    PanelConfig::new(
        Url::parse(&server.uri()).unwrap(),
        AuthCredentials::Session {
            username: "alice".into(),
            password: "hunter2".to_string().into(),
            totp: totp.map(|t| t.to_string().into()),
        },
    )
}

async fn mount_login(server: &MockServer, data: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(ResponseTemplate::new(204))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": data })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn api_key_connect_loads_user() {
    let server = MockServer::start().await;
    mount_account(&server, true).await;

    let panel = assert_ok!(Panel::connect(api_key_config(&server), &Notifications::new()).await);
    assert_eq!(panel.user().id, 7);
    assert!(panel.user().root_admin);
}

#[tokio::test]
async fn session_connect_completes_checkpoint_with_totp() {
    let server = MockServer::start().await;
    mount_login(
        &server,
        json!({ "complete": false, "confirmation_token": "confirm-1" }),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/auth/login/checkpoint"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "complete": true, "intended": "/" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_account(&server, false).await;

    let panel = assert_ok!(
        Panel::connect(session_config(&server, Some("123456")), &Notifications::new()).await
    );
    assert_eq!(panel.user().username, "alice");
}

#[tokio::test]
async fn checkpoint_without_totp_fails() {
    let server = MockServer::start().await;
    mount_login(
        &server,
        json!({ "complete": false, "confirmation_token": "confirm-1" }),
    )
    .await;

    let notifications = Notifications::new();
    let result = Panel::connect(session_config(&server, None), &notifications).await;
    assert!(matches!(result, Err(CoreError::TwoFactorRequired)));
    assert_eq!(notifications.snapshot().len(), 1);
}

#[tokio::test]
async fn rejected_login_is_flashed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": [{ "code": "DisplayException", "status": "422",
                         "detail": "These credentials do not match our records." }]
        })))
        .mount(&server)
        .await;

    let notifications = Notifications::new();
    let result = Panel::connect(session_config(&server, None), &notifications).await;
    assert!(matches!(result, Err(CoreError::AuthenticationFailed { .. })));
    let flashes = notifications.snapshot();
    assert_eq!(flashes.len(), 1);
    assert_eq!(
        flashes[0].message,
        "These credentials do not match our records."
    );
}

#[tokio::test]
async fn blank_password_is_rejected_before_any_request() {
    let server = MockServer::start().await;
    let config = PanelConfig::new(
        Url::parse(&server.uri()).unwrap(),
        AuthCredentials::Session {
            username: "alice".into(),
            password: String::new().into(),
            totp: None,
        },
    );

    let notifications = Notifications::new();
    let result = Panel::connect(config, &notifications).await;
    assert!(matches!(result, Err(CoreError::AuthenticationFailed { .. })));
    let flashes = notifications.snapshot();
    assert_eq!(flashes.len(), 1);
    assert_eq!(flashes[0].message, "Please enter your account password.");
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn telemetry_is_normalized() {
    let server = MockServer::start().await;
    mount_account(&server, false).await;
    Mock::given(method("GET"))
        .and(path(format!("/api/client/servers/{UUID_A}/resources")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "stats",
            "attributes": {
                "current_state": "stopping",
                "is_suspended": false,
                "resources": { "memory_bytes": 1024, "cpu_absolute": 12.5, "disk_bytes": 2048,
                               "network_rx_bytes": 0, "network_tx_bytes": 0, "uptime": 0 }
            }
        })))
        .mount(&server)
        .await;

    let panel = Panel::connect(api_key_config(&server), &Notifications::new())
        .await
        .unwrap();
    let sample = assert_ok!(panel.fetch_telemetry(Uuid::parse_str(UUID_A).unwrap()).await);
    assert_eq!(sample.status, ServerStatus::Stopping);
    assert_eq!(sample.disk_usage_bytes, 2048);
}

#[tokio::test]
async fn controller_over_panel_resets_empty_page() {
    let server = MockServer::start().await;
    mount_account(&server, true).await;
    Mock::given(method("GET"))
        .and(path("/api/client"))
        .and(query_param("page", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list", "data": [],
            "meta": { "pagination": { "total": 1, "count": 0, "per_page": 50, "current_page": 4, "total_pages": 1 } }
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/client"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [{ "object": "server", "attributes": {
                "identifier": "1a7ce997", "uuid": UUID_A, "name": "Survival", "node": "node-1",
                "status": null, "is_transferring": false,
                "limits": { "memory": 1024, "disk": 0, "cpu": 100 }
            } }],
            "meta": { "pagination": { "total": 1, "count": 1, "per_page": 50, "current_page": 1, "total_pages": 1 } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let notifications = Notifications::new();
    let panel = Arc::new(
        Panel::connect(api_key_config(&server), &notifications)
            .await
            .unwrap(),
    );
    let mut controller = EntityListController::new(
        Arc::clone(&panel),
        panel.user().clone(),
        Arc::new(PreferenceStore::in_memory()),
        notifications.clone(),
        &Location::parse("/?page=4"),
    );

    let page = assert_ok!(controller.refresh().await);
    assert_eq!(controller.page_number(), 1);
    assert_eq!(controller.location().to_string(), "/");
    assert_eq!(page.items[0].name, "Survival");
    assert_eq!(page.items[0].status, ServerStatus::Offline);
    assert!(notifications.for_scope(FLASH_SCOPE).is_empty());
}

#[tokio::test]
async fn list_failure_surfaces_flash() {
    let server = MockServer::start().await;
    mount_account(&server, false).await;
    Mock::given(method("GET"))
        .and(path("/api/client"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "errors": [{ "code": "HttpException", "status": "500",
                         "detail": "An unexpected error was encountered while processing this request." }]
        })))
        .mount(&server)
        .await;

    let notifications = Notifications::new();
    let panel = Arc::new(
        Panel::connect(api_key_config(&server), &notifications)
            .await
            .unwrap(),
    );
    let mut controller = EntityListController::new(
        Arc::clone(&panel),
        panel.user().clone(),
        Arc::new(PreferenceStore::in_memory()),
        notifications.clone(),
        &Location::default(),
    );

    assert_err!(controller.refresh().await);
    let flashes = notifications.for_scope(FLASH_SCOPE);
    assert_eq!(flashes.len(), 1);
    assert!(flashes[0].message.starts_with("An unexpected error"));
    assert!(controller.page().is_none());
}
