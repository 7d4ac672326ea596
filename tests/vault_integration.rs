//! Secret resolution against a mock vault and token endpoint.

use std::time::Duration;

use relay_sample::config::VaultConfig;
use relay_sample::vault::{resolve_secret, ClientCredentials, VaultClient, VaultCredential, VaultError};
use relay_sample::GatewayClient;

mod common;
use common::{gateway_config, start_mock_server, MockServer, Reply};

const SECRET_PATH: &str = "/secrets/apim-master-subscription-key";
const TOKEN_PATH: &str = "/tenant-1/oauth2/v2.0/token";

fn static_client(server: &MockServer) -> VaultClient {
    VaultClient::new(
        &server.url(),
        VaultCredential::StaticToken("static-token".into()),
        Duration::from_secs(5),
    )
    .unwrap()
}

fn service_principal(server: &MockServer) -> VaultCredential {
    VaultCredential::ClientCredentials(ClientCredentials {
        tenant_id: "tenant-1".into(),
        client_id: "client-1".into(),
        client_secret: "s3cret".into(),
        scope: VaultConfig::default().scope,
        authority_host: server.url(),
    })
}

#[tokio::test]
async fn test_static_token_resolves_secret() {
    let server = start_mock_server(|req| {
        if req.is("GET", SECRET_PATH) {
            Reply::json(200, r#"{"value":"key-123","id":"https://kv/secrets/apim-master-subscription-key/1"}"#)
        } else {
            Reply::status(404)
        }
    })
    .await;

    let value = static_client(&server)
        .resolve("apim-master-subscription-key")
        .await
        .unwrap();
    assert_eq!(value, "key-123");

    let req = &server.requests()[0];
    assert_eq!(req.header("Authorization"), Some("Bearer static-token"));
    assert_eq!(req.query.as_deref(), Some("api-version=7.4"));
}

#[tokio::test]
async fn test_client_credentials_flow() {
    let server = start_mock_server(|req| {
        if req.is("POST", TOKEN_PATH) {
            Reply::json(200, r#"{"token_type":"Bearer","expires_in":3599,"access_token":"issued-token"}"#)
        } else if req.is("GET", SECRET_PATH) && req.header("Authorization") == Some("Bearer issued-token") {
            Reply::json(200, r#"{"value":"key-123"}"#)
        } else {
            Reply::status(401)
        }
    })
    .await;

    let http = reqwest::Client::new();
    let value = resolve_secret(
        &http,
        &server.url(),
        service_principal(&server),
        "apim-master-subscription-key",
    )
    .await
    .unwrap();
    assert_eq!(value, "key-123");

    let token_request = server
        .requests()
        .into_iter()
        .find(|r| r.is("POST", TOKEN_PATH))
        .unwrap();
    assert!(token_request.body.contains("grant_type=client_credentials"));
    assert!(token_request.body.contains("client_id=client-1"));
    assert!(token_request.body.contains("scope=https%3A%2F%2Fvault.azure.net%2F.default"));
}

#[tokio::test]
async fn test_rejected_service_principal() {
    let server = start_mock_server(|_| Reply::json(401, r#"{"error":"invalid_client"}"#)).await;

    let err = resolve_secret(
        &reqwest::Client::new(),
        &server.url(),
        service_principal(&server),
        "apim-master-subscription-key",
    )
    .await
    .unwrap_err();
    assert!(matches!(err, VaultError::AuthFailure { status } if status.as_u16() == 401));
    assert_eq!(server.count("GET", SECRET_PATH), 0);
}

#[tokio::test]
async fn test_vault_error_mapping() {
    let server = start_mock_server(|req| match req.path.as_str() {
        "/secrets/missing" => Reply::json(404, r#"{"error":{"code":"SecretNotFound"}}"#),
        "/secrets/forbidden" => Reply::json(403, r#"{"error":{"code":"Forbidden"}}"#),
        "/secrets/broken" => Reply::status(503),
        "/secrets/garbled" => Reply::json(200, "not json"),
        _ => Reply::json(200, r#"{"id":"no-value"}"#),
    })
    .await;
    let client = static_client(&server);

    assert!(matches!(
        client.resolve("missing").await,
        Err(VaultError::SecretNotFound { ref name }) if name == "missing"
    ));
    assert!(matches!(
        client.resolve("forbidden").await,
        Err(VaultError::AuthFailure { status }) if status.as_u16() == 403
    ));
    assert!(matches!(client.resolve("broken").await, Err(VaultError::Unavailable(_))));
    assert!(matches!(client.resolve("garbled").await, Err(VaultError::Malformed(_))));
    assert!(matches!(client.resolve("empty").await, Err(VaultError::Malformed(_))));
}

#[tokio::test]
async fn test_resolved_key_reaches_gateway() {
    let vault = start_mock_server(|_| Reply::json(200, r#"{"value":"key-from-vault"}"#)).await;
    let gateway_backend = start_mock_server(|_| Reply::json(200, r#"{"id":"abc123"}"#)).await;

    let key = static_client(&vault)
        .resolve("apim-master-subscription-key")
        .await
        .unwrap();
    let gateway = GatewayClient::new(&gateway_config(&gateway_backend.url()), &key).unwrap();
    gateway.publish_message("Hello, world!").await.unwrap();

    let req = &gateway_backend.requests()[0];
    assert_eq!(req.header("Subscription-Key"), Some("key-from-vault"));
}
