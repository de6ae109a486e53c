#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Integration tests for the request interceptor.
//!
//! Covers the documentation bypass list, the access-log toggle, and the
//! pass-through guarantee (responses come back unmodified).

use axum::body::Body;
use axum::http::{Request, StatusCode, header};

mod common;
use common::{TestApp, body_bytes};

#[tokio::test]
async fn docs_paths_bypass_the_access_log() {
    let app = TestApp::new();

    for path in ["/docs", "/openapi.json", "/redoc"] {
        let response = app
            .request(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await;
        assert_eq!(response.status(), StatusCode::OK, "GET {path}");
    }

    assert!(app.sink.records().is_empty());
}

#[tokio::test]
async fn openapi_document_is_served_verbatim() {
    let app = TestApp::new();

    let response = app
        .request(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let document: serde_json::Value =
        serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(document["openapi"], "3.1.0");
    assert!(document["paths"]["/items/{item_id}"].is_object());
}

#[tokio::test]
async fn docs_uis_reference_the_schema() {
    let app = TestApp::new();

    for path in ["/docs", "/redoc"] {
        let response = app
            .request(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await;

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(content_type.starts_with("text/html"), "GET {path}");

        let page = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
        assert!(page.contains("/openapi.json"), "GET {path}");
    }
}

#[tokio::test]
async fn responses_pass_through_unmodified() {
    let app = TestApp::new();

    let response = app
        .request(
            Request::builder()
                .uri("/items/7")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], b"item 7");
}

#[tokio::test]
async fn disabled_access_log_records_nothing() {
    let app = TestApp::with_access_log(false);

    let response = app
        .request(
            Request::builder()
                .method("POST")
                .uri("/echo")
                .body(Body::from("still works"))
                .unwrap(),
        )
        .await;

    // The pipeline is untouched; only the side effect is gone.
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], b"still works");
    assert!(app.sink.records().is_empty());
}

#[tokio::test]
async fn health_reports_catalog_state() {
    let app = TestApp::new();

    let response = app
        .request(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let payload: serde_json::Value = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(payload["status"], "healthy");
    assert_eq!(payload["api_description_loaded"], true);
}
