// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Shared fixtures for the API tests
//!
//! Models are replaced by in-process doubles so the router can be driven
//! without model weights.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{ImageFormat, Rgb, RgbImage};
use inference_api::{
    api::http_server::{create_app, AppState},
    audio::AudioBuffer,
    speech::{SpeechTranslator, Transcription},
    vision::{Detection, ObjectDetector},
    InferenceError, ModelRegistry, ServerConfig,
};
use serde_json::Value;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::util::ServiceExt;

pub const BOUNDARY: &str = "----inference-api-test-boundary";

/// Detector returning a fixed result
pub struct MockDetector {
    result: Result<Vec<Detection>, String>,
    calls: AtomicUsize,
}

impl MockDetector {
    pub fn returning(detections: Vec<Detection>) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(detections),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ObjectDetector for MockDetector {
    fn name(&self) -> &str {
        "mock-yolov5"
    }

    fn detect(&self, _image: &RgbImage) -> Result<Vec<Detection>, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(InferenceError::Model)
    }
}

/// Translator returning a fixed result; only English is a valid target
pub struct MockTranslator {
    result: Result<Transcription, String>,
    calls: AtomicUsize,
}

impl MockTranslator {
    pub fn returning(language: &str, text: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(Transcription {
                detected_language: language.to_string(),
                text: text.to_string(),
            }),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SpeechTranslator for MockTranslator {
    fn name(&self) -> &str {
        "mock-whisper"
    }

    fn translate(
        &self,
        _audio: &AudioBuffer,
        target_language: &str,
    ) -> Result<Transcription, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if target_language != "en" {
            return Err(InferenceError::UnsupportedTargetLanguage(
                target_language.to_string(),
            ));
        }
        self.result.clone().map_err(InferenceError::Model)
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        save_debug_images: false,
        ..ServerConfig::default()
    }
}

pub fn app_with(
    detector: Arc<MockDetector>,
    translator: Arc<MockTranslator>,
    config: ServerConfig,
) -> Router {
    let models = ModelRegistry::from_parts(detector, translator);
    create_app(Arc::new(AppState::new(models, config)))
}

pub fn detection_app(detector: Arc<MockDetector>) -> Router {
    app_with(detector, MockTranslator::returning("en", ""), test_config())
}

pub fn translation_app(translator: Arc<MockTranslator>) -> Router {
    app_with(MockDetector::returning(vec![]), translator, test_config())
}

pub fn detection(name: &str, class_id: i64, xmin: f32, confidence: f32) -> Detection {
    Detection {
        xmin,
        ymin: 20.0,
        xmax: xmin + 50.0,
        ymax: 90.0,
        confidence,
        class_id,
        name: name.to_string(),
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([120, 80, 40]));
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

pub fn png_base64(width: u32, height: u32) -> String {
    STANDARD.encode(png_bytes(width, height))
}

/// One second of a 440 Hz tone as 16-bit mono WAV
pub fn wav_bytes(sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..sample_rate {
            let t = i as f32 / sample_rate as f32;
            let sample = (t * 440.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
            writer
                .write_sample((sample * i16::MAX as f32) as i16)
                .unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

pub fn wav_base64(sample_rate: u32) -> String {
    STANDARD.encode(wav_bytes(sample_rate))
}

/// About one second of silent MPEG-1 Layer III, 44.1 kHz mono at 128 kbit/s
pub fn mp3_bytes() -> Vec<u8> {
    const FRAME_LEN: usize = 417;
    let mut frame = vec![0u8; FRAME_LEN];
    frame[..4].copy_from_slice(&[0xFF, 0xFB, 0x90, 0xC0]);
    frame.repeat(40)
}

pub fn json_request(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

/// Multipart request with a single file field
pub fn multipart_request(uri: &str, field: &str, file_name: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Send a request and parse the JSON body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
