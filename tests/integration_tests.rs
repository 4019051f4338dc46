// Integration tests for the JWKS endpoint

use axum::{
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use jwks_bearer::config::default_log_filter;
use jwks_bearer::server::create_app;
use jwks_bearer::{JwksResponse, KeyPair, load_private_key, publish_jwk};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing_subscriber::EnvFilter;

const FIXTURE_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/private_key.pem");

fn app_state() -> Arc<KeyPair> {
    Arc::new(load_private_key(FIXTURE_PATH).expect("fixture key"))
}

async fn get_jwks(uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let app = create_app(app_state());
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, body.to_vec())
}

/// Test the complete JWKS endpoint functionality
#[tokio::test]
async fn test_jwks_endpoint_integration() {
    let (status, content_type, body) = get_jwks("/.well-known/jwks.json").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));

    let body_str = std::str::from_utf8(&body).unwrap();

    // Validate JWKS structure
    assert!(body_str.contains("\"keys\""));
    assert!(body_str.contains("\"kty\":\"RSA\""));
    assert!(body_str.contains("\"use\":\"sig\""));
    assert!(body_str.contains("\"alg\":\"RS256\""));
    assert!(body_str.contains("\"kid\""));
    assert!(body_str.contains("\"n\""));
    assert!(body_str.contains("\"e\""));
}

/// The served key is exactly the published JWK of the configured key
#[tokio::test]
async fn test_jwks_serves_single_key_with_thumbprint_kid() {
    let (_, _, body) = get_jwks("/.well-known/jwks.json").await;
    let jwks: JwksResponse = serde_json::from_slice(&body).expect("valid JWKS");

    let key_pair = load_private_key(FIXTURE_PATH).unwrap();
    assert_eq!(jwks.keys, vec![publish_jwk(&key_pair)]);
    assert_eq!(jwks.keys[0].kid, key_pair.key_id());
}

/// Repeated requests return identical documents
#[tokio::test]
async fn test_jwks_is_stable_across_requests() {
    let (_, _, first) = get_jwks("/.well-known/jwks.json").await;
    let (_, _, second) = get_jwks("/.well-known/jwks.json").await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn test_alternative_endpoint() {
    let (status, _, body) = get_jwks("/jwks").await;
    assert_eq!(status, StatusCode::OK);

    let (_, _, canonical) = get_jwks("/.well-known/jwks.json").await;
    assert_eq!(body, canonical);
}

/// Test invalid endpoints return 404
#[tokio::test]
async fn test_invalid_endpoints() {
    let (status, _, _) = get_jwks("/invalid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// Test method validation - POST on the JWKS endpoint should fail
#[tokio::test]
async fn test_method_validation() {
    let app = create_app(app_state());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/.well-known/jwks.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

/// Shared buffer collecting formatted log lines
#[derive(Clone, Default)]
struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Served requests show up in the log without `-v` or `RUST_LOG`
#[tokio::test]
async fn test_requests_are_logged_at_default_level() {
    let logs = CapturedLogs::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(default_log_filter(false)))
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let (status, _, _) = get_jwks("/.well-known/jwks.json").await;
    assert_eq!(status, StatusCode::OK);

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("finished processing request"), "log output: {output:?}");
    assert!(output.contains("status=200"), "log output: {output:?}");
    assert!(output.contains("/.well-known/jwks.json"), "log output: {output:?}");
}
