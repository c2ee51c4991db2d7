// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Route registration tests
//!
//! These tests verify that:
//! - GET / redirects to the docs page
//! - The docs, OpenAPI and health routes respond
//! - Inference routes only accept POST
//! - Request bodies above the configured limit are refused

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::json;
use tower::util::ServiceExt;

use super::support::{
    app_with, detection_app, json_request, png_base64, send, test_config, MockDetector,
    MockTranslator,
};

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[cfg(test)]
mod route_registration_tests {
    use super::*;

    #[tokio::test]
    async fn test_index_redirects_to_docs() {
        let app = detection_app(MockDetector::returning(vec![]));

        let response = app.oneshot(get("/")).await.unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], "/docs");
    }

    #[tokio::test]
    async fn test_docs_page() {
        let app = detection_app(MockDetector::returning(vec![]));

        let response = app.oneshot(get("/docs")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("/detect-objects"));
        assert!(html.contains("/translate-audio"));
    }

    #[tokio::test]
    async fn test_openapi_document() {
        let app = detection_app(MockDetector::returning(vec![]));

        let response = app.oneshot(get("/openapi.yaml")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let yaml = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(yaml.starts_with("openapi:"));
        assert!(yaml.contains("/detect-objects-upload:"));
    }

    #[tokio::test]
    async fn test_health_reports_models() {
        let app = detection_app(MockDetector::returning(vec![]));

        let (status, json) = send(app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
        assert_eq!(
            json["models"],
            json!({"detector": "mock-yolov5", "translator": "mock-whisper"})
        );
        assert_eq!(json["version"]["version"], inference_api::version::VERSION_NUMBER);
    }

    #[tokio::test]
    async fn test_inference_routes_reject_get() {
        for uri in [
            "/detect-objects",
            "/detect-objects-upload",
            "/translate-audio",
            "/translate-audio-upload",
        ] {
            let app = detection_app(MockDetector::returning(vec![]));
            let response = app.oneshot(get(uri)).await.unwrap();
            assert_eq!(
                response.status(),
                StatusCode::METHOD_NOT_ALLOWED,
                "GET {} should not be allowed",
                uri
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = detection_app(MockDetector::returning(vec![]));
        let response = app.oneshot(get("/v1/unknown")).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_body_over_limit_is_refused() {
        let config = inference_api::ServerConfig {
            max_upload_bytes: 16,
            ..test_config()
        };
        let detector = MockDetector::returning(vec![]);
        let app = app_with(detector.clone(), MockTranslator::returning("en", ""), config);

        let body = json!({ "image": png_base64(64, 64) }).to_string();
        assert!(body.len() > 16);
        let (status, _) = send(app, json_request("/detect-objects", body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(detector.calls(), 0);
    }
}
