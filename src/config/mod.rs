// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Server configuration
//!
//! Every flag can also be set through its environment variable. `.env` is
//! loaded by the binary before parsing.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Object detection and speech translation API server
#[derive(Parser, Debug, Clone)]
#[command(name = "inference-api")]
#[command(version)]
#[command(about = "HTTP API for object detection and speech translation", long_about = None)]
pub struct ServerConfig {
    /// Address to bind
    #[arg(long, env = "API_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "API_PORT", default_value_t = 8080)]
    pub port: u16,

    /// YOLOv5 ONNX model file
    #[arg(long, env = "DETECTOR_MODEL_PATH", default_value = "./res/models/yolov5x.onnx")]
    pub detector_model: PathBuf,

    /// Whisper ggml model file
    #[arg(long, env = "WHISPER_MODEL_PATH", default_value = "./res/models/ggml-base.bin")]
    pub whisper_model: PathBuf,

    /// Directory annotated detection images are written under
    #[arg(long, env = "RESULTS_DIR", default_value = "./res/runs")]
    pub results_dir: PathBuf,

    /// Write an annotated copy of every detection request
    #[arg(
        long,
        env = "SAVE_DEBUG_IMAGES",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub save_debug_images: bool,

    /// Minimum detection confidence (0.0-1.0)
    #[arg(long, env = "DETECTION_CONFIDENCE", default_value_t = 0.25)]
    pub confidence_threshold: f32,

    /// NMS IoU threshold (0.0-1.0)
    #[arg(long, env = "DETECTION_IOU", default_value_t = 0.45)]
    pub iou_threshold: f32,

    /// Maximum detections per image
    #[arg(long, env = "DETECTION_MAX", default_value_t = 1000)]
    pub max_detections: usize,

    /// ONNX Runtime intra-op threads for the detector
    #[arg(long, env = "DETECTOR_THREADS", default_value_t = 4)]
    pub detector_threads: usize,

    /// whisper.cpp threads per translation
    #[arg(long, env = "WHISPER_THREADS", default_value_t = 4)]
    pub whisper_threads: usize,

    /// Maximum request body size in bytes
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 25 * 1024 * 1024)]
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            detector_model: PathBuf::from("./res/models/yolov5x.onnx"),
            whisper_model: PathBuf::from("./res/models/ggml-base.bin"),
            results_dir: PathBuf::from("./res/runs"),
            save_debug_images: true,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 1000,
            detector_threads: 4,
            whisper_threads: 4,
            max_upload_bytes: 25 * 1024 * 1024,
        }
    }
}

impl ServerConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("Port must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(format!(
                "Confidence threshold must be between 0 and 1, got {}",
                self.confidence_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.iou_threshold) {
            return Err(format!(
                "IoU threshold must be between 0 and 1, got {}",
                self.iou_threshold
            ));
        }
        if self.max_detections == 0 {
            return Err("Max detections must be greater than 0".to_string());
        }
        if self.detector_threads == 0 || self.whisper_threads == 0 {
            return Err("Thread counts must be greater than 0".to_string());
        }
        if self.max_upload_bytes == 0 {
            return Err("Max upload size must be greater than 0".to_string());
        }
        Ok(())
    }

    /// Socket address to bind
    pub async fn bind_addr(&self) -> Result<SocketAddr, String> {
        tokio::net::lookup_host((self.host.as_str(), self.port))
            .await
            .map_err(|e| format!("Invalid bind address {}:{}: {}", self.host, self.port, e))?
            .next()
            .ok_or_else(|| format!("Bind host {} resolved to no addresses", self.host))
    }
}
