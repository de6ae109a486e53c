#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Builds the REAL kernel router (documentation and health routes plus the
//! interceptor middleware) around an in-memory catalog and a sink that
//! records every emitted entry, then drives it with `tower::ServiceExt`.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{ConnectInfo, Path};
use axum::http::Request;
use axum::response::Response;
use axum::routing::{get, post};
use tower::ServiceExt;

use registro_kernel::middleware::{self, AccessLogRecord};
use registro_kernel::routes;
use registro_kernel::services::catalog::ApiCatalog;
use registro_kernel::services::sink::AccessLogSink;
use registro_kernel::services::token::TokenService;
use registro_kernel::state::AppState;

/// HMAC secret shared by the test app and test token builders.
pub const TEST_JWT_SECRET: &str = "integration-test-secret";

/// Peer address stamped onto every test request.
pub const TEST_PEER: ([u8; 4], u16) = ([127, 0, 0, 1], 52000);

/// Sink that stores every record for later assertions.
#[derive(Default)]
pub struct RecordingSink {
    records: Mutex<Vec<AccessLogRecord>>,
}

impl RecordingSink {
    /// Snapshot of everything emitted so far.
    pub fn records(&self) -> Vec<AccessLogRecord> {
        self.records.lock().unwrap().clone()
    }
}

impl AccessLogSink for RecordingSink {
    fn emit(&self, record: &AccessLogRecord) {
        self.records.lock().unwrap().push(record.clone());
    }
}

/// Test fixture: the assembled app plus a handle on the recording sink.
pub struct TestApp {
    router: Router,
    pub sink: Arc<RecordingSink>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_access_log(true)
    }

    /// Build the app with access logging on or off.
    ///
    /// The router carries the kernel's real routes plus two test routes
    /// exercising path parameters and body consumption.
    pub fn with_access_log(enabled: bool) -> Self {
        let catalog = ApiCatalog::from_document(serde_json::json!({
            "openapi": "3.1.0",
            "paths": {
                "/items/{item_id}": {
                    "get": { "tags": ["items", "read"], "summary": "Fetch one item" }
                },
                "/echo": {
                    "post": { "tags": ["echo"], "summary": "Echo the request body" }
                }
            }
        }));

        let sink = Arc::new(RecordingSink::default());
        let state = AppState::with_services(
            catalog,
            TokenService::new(TEST_JWT_SECRET.as_bytes()),
            sink.clone(),
            enabled,
        );

        let router = Router::new()
            .merge(routes::docs::router())
            .merge(routes::health::router())
            .route("/items/{item_id}", get(get_item))
            .route("/echo", post(echo))
            .route_layer(axum::middleware::from_fn_with_state(
                state.clone(),
                middleware::intercept_request,
            ))
            .with_state(state);

        Self { router, sink }
    }

    /// Drive one request through the real middleware stack.
    ///
    /// `axum::serve` provides `ConnectInfo` per connection; `oneshot` does
    /// not, so the test peer address is stamped on here.
    pub async fn request(&self, mut request: Request<Body>) -> Response {
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(TEST_PEER)));
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// The single record the sink should hold after exactly one logged
    /// request.
    pub fn only_record(&self) -> AccessLogRecord {
        let records = self.sink.records();
        assert_eq!(records.len(), 1, "expected exactly one access-log record");
        records.into_iter().next().unwrap()
    }
}

async fn get_item(Path(item_id): Path<String>) -> String {
    format!("item {item_id}")
}

async fn echo(body: Bytes) -> Bytes {
    body
}

/// Collect a response body into bytes.
pub async fn body_bytes(response: Response) -> Bytes {
    use http_body_util::BodyExt;
    response.into_body().collect().await.unwrap().to_bytes()
}

/// Seconds since the epoch.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

/// Build an HS256 token over the given claims, signed with the test secret.
pub fn make_token(claims: &serde_json::Value) -> String {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .unwrap()
}
