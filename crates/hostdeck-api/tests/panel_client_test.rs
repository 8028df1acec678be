#![allow(clippy::unwrap_used)]
// Integration tests for `PanelClient` using wiremock.

use secrecy::SecretString;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hostdeck_api::{Error, LoginOutcome, LoginRequest, PanelClient, ServerScope, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup_api_key() -> (MockServer, PanelClient) {
    let server = MockServer::start().await;
    let key: SecretString = "ptlc_test".to_string().into();
    let client =
        PanelClient::from_api_key(&server.uri(), &key, &TransportConfig::default()).unwrap();
    (server, client)
}

async fn setup_session() -> (MockServer, PanelClient) {
    let server = MockServer::start().await;
    let client = PanelClient::with_session(&server.uri(), &TransportConfig::default()).unwrap();

    Mock::given(method("GET"))
        .and(path("/sanctum/csrf-cookie"))
        .respond_with(
            ResponseTemplate::new(204)
                .insert_header("Set-Cookie", "XSRF-TOKEN=xsrf%3Dvalue; Path=/"),
        )
        .mount(&server)
        .await;

    (server, client)
}

fn server_json(identifier: &str, uuid: &str, name: &str) -> serde_json::Value {
    json!({
        "object": "server",
        "attributes": {
            "server_owner": true,
            "identifier": identifier,
            "uuid": uuid,
            "name": name,
            "node": "node-1",
            "status": null,
            "is_transferring": false,
            "limits": { "memory": 1024, "swap": 0, "disk": 0, "io": 500, "cpu": 100, "threads": null }
        }
    })
}

const UUID_A: &str = "1a7ce997-259b-452e-8b4e-cecc464142ca";
const UUID_B: &str = "9b1c8ec2-7d2e-4b3d-a5f4-08e7c1d5b6a1";

// ── Server list ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_servers_with_pagination() {
    let (server, client) = setup_api_key().await;

    Mock::given(method("GET"))
        .and(path("/api/client"))
        .and(query_param("page", "2"))
        .and(header("Authorization", "Bearer ptlc_test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [server_json("1a7ce997", UUID_A, "Survival"), server_json("9b1c8ec2", UUID_B, "Creative")],
            "meta": { "pagination": {
                "total": 27, "count": 2, "per_page": 25, "current_page": 2, "total_pages": 2, "links": {}
            } }
        })))
        .mount(&server)
        .await;

    let (servers, pagination) = client
        .list_servers(2, ServerScope::Own)
        .await
        .unwrap()
        .into_items();

    assert_eq!(servers.len(), 2);
    assert_eq!(servers[0].name, "Survival");
    assert_eq!(servers[1].uuid, Uuid::parse_str(UUID_B).unwrap());
    assert_eq!(pagination.current_page, 2);
    assert_eq!(pagination.total_pages, 2);
    assert_eq!(pagination.total, 27);
}

#[tokio::test]
async fn test_list_servers_admin_scope_sends_type() {
    let (server, client) = setup_api_key().await;

    Mock::given(method("GET"))
        .and(path("/api/client"))
        .and(query_param("type", "admin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "list",
            "data": [],
            "meta": { "pagination": {
                "total": 0, "count": 0, "per_page": 25, "current_page": 1, "total_pages": 1
            } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let list = client.list_servers(1, ServerScope::Admin).await.unwrap();
    assert!(list.data.is_empty());
}

// ── Resources ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_server_resources() {
    let (server, client) = setup_api_key().await;

    Mock::given(method("GET"))
        .and(path(format!("/api/client/servers/{UUID_A}/resources")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "stats",
            "attributes": {
                "current_state": "running",
                "is_suspended": false,
                "resources": {
                    "memory_bytes": 943_718_400u64,
                    "cpu_absolute": 95.5,
                    "disk_bytes": 1_048_576u64,
                    "network_rx_bytes": 2048,
                    "network_tx_bytes": 4096,
                    "uptime": 3_600_000u64
                }
            }
        })))
        .mount(&server)
        .await;

    let stats = client
        .get_server_resources(&Uuid::parse_str(UUID_A).unwrap())
        .await
        .unwrap();

    assert_eq!(stats.current_state, "running");
    assert!(!stats.is_suspended);
    assert_eq!(stats.resources.memory_bytes, 943_718_400);
    assert!((stats.resources.cpu_absolute - 95.5).abs() < f64::EPSILON);
    assert_eq!(stats.resources.uptime, 3_600_000);
}

#[tokio::test]
async fn test_get_account() {
    let (server, client) = setup_api_key().await;

    Mock::given(method("GET"))
        .and(path("/api/client/account"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "object": "user",
            "attributes": {
                "id": 7, "admin": true, "username": "root", "email": "root@example.com",
                "first_name": "Root", "last_name": "Admin", "language": "en"
            }
        })))
        .mount(&server)
        .await;

    let account = client.get_account().await.unwrap();
    assert_eq!(account.id, 7);
    assert!(account.admin);
    assert_eq!(account.username, "root");
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_api_key() {
    let (server, client) = setup_api_key().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_servers(1, ServerScope::Own).await;
    assert!(
        matches!(result, Err(Error::InvalidApiKey)),
        "expected InvalidApiKey, got: {result:?}"
    );
}

#[tokio::test]
async fn test_panel_error_body_is_decoded() {
    let (server, client) = setup_api_key().await;

    Mock::given(method("GET"))
        .and(path(format!("/api/client/servers/{UUID_A}/resources")))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "errors": [{
                "code": "ConflictHttpException",
                "status": "409",
                "detail": "This server is currently being transferred."
            }]
        })))
        .mount(&server)
        .await;

    let result = client
        .get_server_resources(&Uuid::parse_str(UUID_A).unwrap())
        .await;

    match result {
        Err(Error::Api {
            ref message,
            ref code,
            status,
        }) => {
            assert_eq!(status, 409);
            assert!(message.contains("transferred"), "got: {message}");
            assert_eq!(code.as_deref(), Some("ConflictHttpException"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_reads_retry_after() {
    let (server, client) = setup_api_key().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "12"))
        .mount(&server)
        .await;

    let result = client.get_account().await;
    assert!(
        matches!(result, Err(Error::RateLimited { retry_after_secs: 12 })),
        "expected RateLimited, got: {result:?}"
    );
}

// ── Session login ───────────────────────────────────────────────────

#[tokio::test]
async fn test_login_complete() {
    let (server, client) = setup_session().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(header("X-XSRF-TOKEN", "xsrf=value"))
        .and(body_partial_json(json!({
            "user": "admin",
            "password": "hunter2",
            "g-recaptcha-response": "challenge-ok"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "complete": true, "intended": "/server/1a7ce997" }
        })))
        .mount(&server)
        .await;

    let password: SecretString = "hunter2".to_string().into();
    let outcome = client
        .login(&LoginRequest {
            user: "admin",
            password: &password,
            challenge_response: Some("challenge-ok"),
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        LoginOutcome::Complete {
            intended: Some("/server/1a7ce997".into())
        }
    );
}

#[tokio::test]
async fn test_login_checkpoint_flow() {
    let (server, client) = setup_session().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "complete": false, "confirmation_token": "confirm-123" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/auth/login/checkpoint"))
        .and(body_partial_json(json!({
            "confirmation_token": "confirm-123",
            "authentication_code": "654321"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": { "complete": true, "intended": "/" }
        })))
        .mount(&server)
        .await;

    let password: SecretString = "hunter2".to_string().into();
    let outcome = client
        .login(&LoginRequest {
            user: "admin",
            password: &password,
            challenge_response: None,
        })
        .await
        .unwrap();

    let confirmation_token = match outcome {
        LoginOutcome::Checkpoint { confirmation_token } => confirmation_token,
        other => panic!("expected checkpoint, got: {other:?}"),
    };

    let code: SecretString = "654321".to_string().into();
    let intended = client
        .login_checkpoint(&confirmation_token, &code)
        .await
        .unwrap();
    assert_eq!(intended.as_deref(), Some("/"));
}

#[tokio::test]
async fn test_login_failure() {
    let (server, client) = setup_session().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "errors": [{
                "code": "DisplayException",
                "status": "422",
                "detail": "These credentials do not match our records."
            }]
        })))
        .mount(&server)
        .await;

    let password: SecretString = "wrong".to_string().into();
    let result = client
        .login(&LoginRequest {
            user: "admin",
            password: &password,
            challenge_response: None,
        })
        .await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert!(message.contains("do not match"), "got: {message}");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_login_rejected_for_api_key_client() {
    let (_server, client) = setup_api_key().await;

    let password: SecretString = "hunter2".to_string().into();
    let result = client
        .login(&LoginRequest {
            user: "admin",
            password: &password,
            challenge_response: None,
        })
        .await;

    assert!(matches!(result, Err(Error::Authentication { .. })));
}

#[tokio::test]
async fn test_expired_session() {
    let (server, client) = setup_session().await;

    Mock::given(method("GET"))
        .and(path("/api/client/account"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.get_account().await;
    assert!(matches!(result, Err(Error::SessionExpired)));
}
