#![allow(clippy::unwrap_used)]

use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use eerosync_api::{Error, ResponseDump, Session, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup(token: Option<&str>) -> (MockServer, Session) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let mut session = Session::with_client(reqwest::Client::new(), base_url);
    if let Some(token) = token {
        session = session.with_token(SecretString::from(token.to_owned()));
    }
    (server, session)
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "meta": { "code": 200, "server_time": "2024-01-01T00:00:00.000Z" },
        "data": data,
    }))
}

fn rejected(status: u16, error: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({
        "meta": { "code": status, "error": error, "server_time": "2024-01-01T00:00:00.000Z" },
    }))
}

// ── Envelope handling ───────────────────────────────────────────────

#[tokio::test]
async fn test_get_returns_data_and_sends_cookie() {
    let (server, session) = setup(Some("tok")).await;

    Mock::given(method("GET"))
        .and(path("/2.2/account"))
        .and(header("cookie", "s=tok"))
        .respond_with(ok(json!({ "name": "Jane", "log_id": "42" })))
        .expect(1)
        .mount(&server)
        .await;

    let data = session.get("/2.2/account").await.unwrap();
    assert_eq!(data, json!({ "name": "Jane", "log_id": "42" }));
}

#[tokio::test]
async fn test_get_with_body_sends_json() {
    let (server, session) = setup(Some("tok")).await;
    let query = json!({ "start": "2024-01-01T08:00:00Z", "cadence": "hourly" });

    Mock::given(method("GET"))
        .and(path("/2.2/networks/1/insights"))
        .and(body_json(&query))
        .respond_with(ok(json!({ "series": [] })))
        .mount(&server)
        .await;

    let data = session
        .get_with_body("/2.2/networks/1/insights", &query)
        .await
        .unwrap();
    assert_eq!(data, json!({ "series": [] }));
}

#[tokio::test]
async fn test_non_json_error_is_decode_error() {
    let (server, session) = setup(Some("tok")).await;

    Mock::given(method("GET"))
        .and(path("/2.2/account"))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>bad gateway</html>"))
        .mount(&server)
        .await;

    let result = session.get("/2.2/account").await;
    assert!(
        matches!(result, Err(Error::Decode { status: 502, .. })),
        "expected Decode, got: {result:?}"
    );
}

#[tokio::test]
async fn test_other_errors_do_not_refresh() {
    let (server, session) = setup(Some("tok")).await;

    Mock::given(method("GET"))
        .and(path("/2.2/networks/9"))
        .respond_with(rejected(404, "error.network.not_found"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.2/login/refresh"))
        .respond_with(ok(json!({ "user_token": "fresh" })))
        .expect(0)
        .mount(&server)
        .await;

    let err = session.get("/2.2/networks/9").await.unwrap_err();
    match err {
        Error::Api {
            status,
            code,
            error,
            payload,
            ..
        } => {
            assert_eq!(status, 404);
            assert_eq!(code, Some(404));
            assert_eq!(error.as_deref(), Some("error.network.not_found"));
            assert!(payload.contains("error.network.not_found"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_error_exposes_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/teapot"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&server)
        .await;

    let err = reqwest::get(format!("{}/teapot", server.uri()))
        .await
        .unwrap()
        .error_for_status()
        .unwrap_err();
    let err = Error::from(err);
    assert!(matches!(err, Error::Transport(_)));
    assert_eq!(err.status(), Some(418));
}

// ── Session refresh ─────────────────────────────────────────────────

#[tokio::test]
async fn test_expired_session_refreshes_once_and_retries() {
    let (server, session) = setup(Some("stale")).await;

    Mock::given(method("GET"))
        .and(path("/2.2/account"))
        .and(header("cookie", "s=stale"))
        .respond_with(rejected(401, "error.session.invalid"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.2/login/refresh"))
        .and(header("cookie", "s=stale"))
        .respond_with(ok(json!({ "user_token": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/2.2/account"))
        .and(header("cookie", "s=fresh"))
        .respond_with(ok(json!({ "name": "Jane" })))
        .expect(1)
        .mount(&server)
        .await;

    let data = session.get("/2.2/account").await.unwrap();
    assert_eq!(data, json!({ "name": "Jane" }));
    assert_eq!(session.token().unwrap().expose_secret(), "fresh");
}

#[tokio::test]
async fn test_second_rejection_surfaces_typed_error() {
    let (server, session) = setup(Some("stale")).await;

    Mock::given(method("GET"))
        .and(path("/2.2/account"))
        .respond_with(rejected(401, "error.session.refresh"))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.2/login/refresh"))
        .respond_with(ok(json!({ "user_token": "fresh" })))
        .expect(1)
        .mount(&server)
        .await;

    let err = session.get("/2.2/account").await.unwrap_err();
    assert!(err.is_session_expired());
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn test_rejected_refresh_aborts_without_retry() {
    let (server, session) = setup(Some("stale")).await;

    Mock::given(method("GET"))
        .and(path("/2.2/account"))
        .respond_with(rejected(401, "error.session.invalid"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.2/login/refresh"))
        .respond_with(rejected(401, "error.session.invalid"))
        .expect(1)
        .mount(&server)
        .await;

    let result = session.get("/2.2/account").await;
    assert!(matches!(result, Err(Error::Api { status: 401, .. })));
    assert_eq!(session.token().unwrap().expose_secret(), "stale");
}

// ── Login flow ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_provisional_token() {
    let (server, session) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/2.2/login"))
        .and(body_json(json!({ "login": "jane@example.com" })))
        .respond_with(ok(json!({ "user_token": "provisional" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.2/login/verify"))
        .and(header("cookie", "s=provisional"))
        .and(body_json(json!({ "code": "123456" })))
        .respond_with(ok(json!({ "user_token": "provisional", "log_id": "42", "name": "Jane" })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!session.is_authenticated());
    session.login("jane@example.com").await.unwrap();
    assert!(session.is_authenticated());

    let verified = session.login_verify("123456").await.unwrap();
    assert_eq!(verified["log_id"], "42");
}

#[tokio::test]
async fn test_login_drops_stale_token() {
    let (server, session) = setup(Some("stale")).await;

    Mock::given(method("POST"))
        .and(path("/2.2/login"))
        .and(header("cookie", "s=stale"))
        .respond_with(rejected(401, "error.session.invalid"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.2/login/refresh"))
        .respond_with(rejected(401, "error.session.invalid"))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/2.2/login"))
        .respond_with(ok(json!({ "user_token": "provisional" })))
        .expect(1)
        .mount(&server)
        .await;

    session.login("jane@example.com").await.unwrap();
    assert_eq!(session.token().unwrap().expose_secret(), "provisional");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(!requests[0].headers.contains_key("cookie"));
}

#[tokio::test]
async fn test_login_without_token_is_missing_field() {
    let (server, session) = setup(None).await;

    Mock::given(method("POST"))
        .and(path("/2.2/login"))
        .respond_with(ok(json!({})))
        .mount(&server)
        .await;

    let result = session.login("jane@example.com").await;
    assert!(matches!(
        result,
        Err(Error::MissingField {
            field: "user_token"
        })
    ));
}

// ── Release notes, timeouts, dumps ──────────────────────────────────

#[tokio::test]
async fn test_release_notes_are_unenveloped_and_cookieless() {
    let (server, session) = setup(Some("tok")).await;
    let notes = json!({ "target": { "os_version": "v7.1.0" }, "history": [] });

    Mock::given(method("GET"))
        .and(path("/manifest.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&notes))
        .mount(&server)
        .await;

    let data = session
        .release_notes(&format!("{}/manifest.json", server.uri()))
        .await
        .unwrap();
    assert_eq!(data, notes);

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("cookie").is_none());
}

#[tokio::test]
async fn test_timeout_is_typed() {
    let server = MockServer::start().await;
    let config = TransportConfig {
        base_url: Url::parse(&server.uri()).unwrap(),
        timeout: Duration::from_millis(50),
        dump_dir: None,
    };
    let session = Session::new(&config).unwrap();

    Mock::given(method("GET"))
        .and(path("/2.2/account"))
        .respond_with(ok(json!({})).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let result = session.get("/2.2/account").await;
    assert!(
        matches!(result, Err(Error::Timeout { .. })),
        "expected Timeout, got: {result:?}"
    );
}

#[tokio::test]
async fn test_responses_are_dumped_by_path() {
    let dir = tempfile::tempdir().unwrap();
    let (server, session) = setup(Some("tok")).await;
    let session = session.with_dump(ResponseDump::new(dir.path()));

    Mock::given(method("GET"))
        .and(path("/2.2/networks/1"))
        .respond_with(ok(json!({ "name": "Home" })))
        .mount(&server)
        .await;

    session.get("/2.2/networks/1").await.unwrap();

    let saved = std::fs::read_to_string(dir.path().join("_2_2_networks_1.json")).unwrap();
    let saved: serde_json::Value = serde_json::from_str(&saved).unwrap();
    assert_eq!(saved, json!({ "name": "Home" }));
}
