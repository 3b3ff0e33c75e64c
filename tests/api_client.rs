//! `ApiClient` against a mock Compose API.
//!
//! The client is blocking, so every call runs inside `spawn_blocking`
//! while the mock server keeps serving on the async runtime.

use pronto_cli::api::{AccountId, ApiClient, ApiError, DeploymentApi};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn blocking<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    tokio::task::spawn_blocking(f).await.unwrap()
}

fn deployment_body() -> serde_json::Value {
    json!({
        "id": "dep_1",
        "name": "pikachu-mongodb",
        "ca_certificate_base64": "QUJD",
        "connection_strings": {
            "cli": ["cli://x"],
            "direct": ["mongodb://y"]
        }
    })
}

#[tokio::test]
async fn fetch_account_id_sends_bearer_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/2016-07/user"))
        .and(header("authorization", "Bearer tok_abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "acct_1",
            "name": "someone"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/2016-07", server.uri());
    let id = blocking(move || ApiClient::new(&base)?.fetch_account_id("tok_abc"))
        .await
        .unwrap();

    assert_eq!(id, AccountId("acct_1".into()));
}

#[tokio::test]
async fn fetch_account_id_reports_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
        .mount(&server)
        .await;

    let base = server.uri();
    let err = blocking(move || ApiClient::new(&base)?.fetch_account_id("nope"))
        .await
        .unwrap_err();

    match err {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status.as_u16(), 401);
            assert_eq!(body, "bad token");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_account_id_rejects_body_without_id() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "name": "x" })))
        .mount(&server)
        .await;

    let base = server.uri();
    let err = blocking(move || ApiClient::new(&base)?.fetch_account_id("tok"))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Malformed { .. }));
}

#[tokio::test]
async fn create_deployment_posts_nested_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/deployments"))
        .and(header("authorization", "Bearer tok_abc"))
        .and(body_json(json!({
            "deployment": {
                "account_id": "acct_1",
                "datacenter": "aws:us-east-1",
                "name": "pikachu-mongodb",
                "type": "mongodb"
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(deployment_body()))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let result = blocking(move || {
        ApiClient::new(&base)?.create_deployment(
            "tok_abc",
            &AccountId("acct_1".into()),
            "mongodb",
            "pikachu-mongodb",
        )
    })
    .await
    .unwrap();

    assert_eq!(result.ca_certificate_base64, "QUJD");
    assert_eq!(result.cli(), "cli://x");
    assert_eq!(result.direct(), "mongodb://y");
}

#[tokio::test]
async fn create_deployment_rejects_empty_connection_strings() {
    let server = MockServer::start().await;
    let mut body = deployment_body();
    body["connection_strings"]["cli"] = json!([]);
    Mock::given(method("POST"))
        .and(path("/deployments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let base = server.uri();
    let err = blocking(move || {
        ApiClient::new(&base)?.create_deployment("tok", &AccountId("a".into()), "redis", "n")
    })
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::Malformed { .. }));
}

#[tokio::test]
async fn create_deployment_surfaces_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/deployments"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let err = blocking(move || {
        ApiClient::new(&base)?.create_deployment("tok", &AccountId("a".into()), "redis", "n")
    })
    .await
    .unwrap_err();

    assert!(matches!(err, ApiError::Status { .. }));
}

#[test]
fn unreachable_server_is_a_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&format!("http://{addr}")).unwrap();
    let err = client.fetch_account_id("tok").unwrap_err();

    assert!(matches!(err, ApiError::Transport { .. }));
}
