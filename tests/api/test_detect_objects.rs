// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Endpoint tests for POST /detect-objects and POST /detect-objects-upload

use axum::http::StatusCode;
use serde_json::json;

use super::support::{
    app_with, detection, detection_app, json_request, multipart_request, png_base64, png_bytes,
    send, test_config, MockDetector, MockTranslator,
};

#[cfg(test)]
mod detect_objects_tests {
    use super::*;

    #[tokio::test]
    async fn test_detections_are_returned() {
        let detector = MockDetector::returning(vec![
            detection("dog", 16, 10.0, 0.91),
            detection("person", 0, 100.0, 0.64),
        ]);
        let app = detection_app(detector.clone());

        let body = json!({ "image": png_base64(64, 48) }).to_string();
        let (status, json) = send(app, json_request("/detect-objects", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["errors"], json!({"Errors": "None"}));

        let results = json["detection_result"].as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["name"], "dog");
        assert_eq!(results[0]["class"], 16);
        assert_eq!(results[1]["name"], "person");
        assert_eq!(detector.calls(), 1);
    }

    #[tokio::test]
    async fn test_detection_boxes_are_well_formed() {
        let detector = MockDetector::returning(vec![
            detection("cat", 15, 0.0, 0.5),
            detection("car", 2, 30.0, 0.99),
        ]);
        let app = detection_app(detector);

        let body = json!({ "image": png_base64(32, 32) }).to_string();
        let (_, json) = send(app, json_request("/detect-objects", body)).await;

        for entry in json["detection_result"].as_array().unwrap() {
            let xmin = entry["xmin"].as_f64().unwrap();
            let xmax = entry["xmax"].as_f64().unwrap();
            let ymin = entry["ymin"].as_f64().unwrap();
            let ymax = entry["ymax"].as_f64().unwrap();
            let confidence = entry["confidence"].as_f64().unwrap();
            assert!(xmin <= xmax);
            assert!(ymin <= ymax);
            assert!((0.0..=1.0).contains(&confidence));
        }
    }

    #[tokio::test]
    async fn test_no_objects_returns_sentinel() {
        let app = detection_app(MockDetector::returning(vec![]));

        let body = json!({ "image": png_base64(16, 16) }).to_string();
        let (status, json) = send(app, json_request("/detect-objects", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({
                "detection_result": [
                    {"detection_result": "Model could not detect any object in the image"}
                ],
                "errors": {"Errors": "None"}
            })
        );
    }

    #[tokio::test]
    async fn test_model_failure_is_reported_with_200() {
        let app = detection_app(MockDetector::failing("Mock exception"));

        let body = json!({ "image": png_base64(16, 16) }).to_string();
        let (status, json) = send(app, json_request("/detect-objects", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({
                "detection_result": [{"ERROR": "An error occurred"}],
                "errors": {"error": "Mock exception"}
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_base64_is_rejected_before_inference() {
        let detector = MockDetector::returning(vec![detection("dog", 16, 0.0, 0.9)]);
        let app = detection_app(detector.clone());

        let body = json!({ "image": "not-base64!!" }).to_string();
        let (status, json) = send(app, json_request("/detect-objects", body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["detail"][0]["loc"], json!(["body", "image"]));
        assert_eq!(json["detail"][0]["msg"], "Invalid base64 string");
        assert_eq!(json["detail"][0]["type"], "value_error");
        assert_eq!(detector.calls(), 0);
    }

    #[tokio::test]
    async fn test_non_image_payload_is_rejected() {
        let app = detection_app(MockDetector::returning(vec![]));

        let payload = base64::Engine::encode(
            &base64::engine::general_purpose::STANDARD,
            b"just some text",
        );
        let body = json!({ "image": payload }).to_string();
        let (status, json) = send(app, json_request("/detect-objects", body)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["detail"][0]["msg"], "No image/invalid image found");
    }

    #[tokio::test]
    async fn test_missing_image_field() {
        let app = detection_app(MockDetector::returning(vec![]));

        let (status, json) = send(app, json_request("/detect-objects", "{}")).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(
            json["detail"][0],
            json!({
                "loc": ["body", "image"],
                "msg": "field required",
                "type": "value_error.missing"
            })
        );
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let app = detection_app(MockDetector::returning(vec![]));

        let (status, json) = send(app, json_request("/detect-objects", "{not json")).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["detail"][0]["loc"], json!(["body"]));
        assert_eq!(json["detail"][0]["type"], "value_error.jsondecode");
    }

    #[tokio::test]
    async fn test_legacy_field_name() {
        let app = detection_app(MockDetector::returning(vec![detection("dog", 16, 0.0, 0.9)]));

        let body = json!({ "b64_image": png_base64(8, 8) }).to_string();
        let (status, json) = send(app, json_request("/detect-objects", body)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["detection_result"][0]["name"], "dog");
    }

    #[tokio::test]
    async fn test_repeated_requests_give_same_labels() {
        let detector = MockDetector::returning(vec![
            detection("dog", 16, 0.0, 0.9),
            detection("bicycle", 1, 60.0, 0.7),
        ]);
        let app = detection_app(detector.clone());
        let body = json!({ "image": png_base64(20, 20) }).to_string();

        let (_, first) = send(app.clone(), json_request("/detect-objects", body.clone())).await;
        let (_, second) = send(app, json_request("/detect-objects", body)).await;

        let names = |v: &serde_json::Value| -> Vec<String> {
            v["detection_result"]
                .as_array()
                .unwrap()
                .iter()
                .map(|d| d["name"].as_str().unwrap().to_string())
                .collect()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(detector.calls(), 2);
    }

    #[tokio::test]
    async fn test_annotated_image_is_saved_when_enabled() {
        let dir = tempfile::tempdir().unwrap();
        let config = inference_api::ServerConfig {
            save_debug_images: true,
            results_dir: dir.path().to_path_buf(),
            ..test_config()
        };
        let app = app_with(
            MockDetector::returning(vec![detection("dog", 16, 2.0, 0.9)]),
            MockTranslator::returning("en", ""),
            config,
        );

        let body = json!({ "image": png_base64(80, 120) }).to_string();
        let (status, _) = send(app, json_request("/detect-objects", body)).await;
        assert_eq!(status, StatusCode::OK);

        let saved: Vec<_> = std::fs::read_dir(dir.path().join("exp"))
            .unwrap()
            .collect();
        assert_eq!(saved.len(), 1);
    }
}

#[cfg(test)]
mod detect_objects_upload_tests {
    use super::*;

    #[tokio::test]
    async fn test_upload_with_two_dogs() {
        let detector = MockDetector::returning(vec![
            detection("dog", 16, 10.0, 0.93),
            detection("dog", 16, 200.0, 0.88),
            detection("frisbee", 29, 120.0, 0.41),
        ]);
        let app = detection_app(detector);

        let request = multipart_request(
            "/detect-objects-upload",
            "file",
            "dogs.png",
            &png_bytes(320, 240),
        );
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        let dogs = json["detection_result"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|d| d["name"] == "dog")
            .count();
        assert_eq!(dogs, 2);
    }

    #[tokio::test]
    async fn test_upload_of_non_image_returns_200_with_error() {
        let detector = MockDetector::returning(vec![detection("dog", 16, 0.0, 0.9)]);
        let app = detection_app(detector.clone());

        let request = multipart_request(
            "/detect-objects-upload",
            "file",
            "notes.txt",
            b"this is not an image at all",
        );
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["detection_result"], json!([{"ERROR": "An error occurred"}]));
        assert_eq!(
            json["errors"]["error"],
            "File uploaded is not a supported image"
        );
        assert_eq!(detector.calls(), 0);
    }

    #[tokio::test]
    async fn test_upload_without_file_field() {
        let app = detection_app(MockDetector::returning(vec![]));

        let request = multipart_request(
            "/detect-objects-upload",
            "attachment",
            "dog.png",
            &png_bytes(8, 8),
        );
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["errors"]["error"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_upload_without_multipart_content_type() {
        let app = detection_app(MockDetector::returning(vec![]));

        let (status, json) = send(app, json_request("/detect-objects-upload", "{}")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["detection_result"], json!([{"ERROR": "An error occurred"}]));
        assert!(json["errors"]["error"].is_string());
    }

    #[tokio::test]
    async fn test_upload_model_failure() {
        let app = detection_app(MockDetector::failing("Mock exception"));

        let request =
            multipart_request("/detect-objects-upload", "file", "x.png", &png_bytes(8, 8));
        let (status, json) = send(app, request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["errors"]["error"], "Mock exception");
    }
}
