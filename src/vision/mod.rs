// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection on CPU
//!
//! This module provides:
//! - Image decoding and format checks
//! - YOLOv5 detection via ONNX Runtime
//! - Annotated debug images of each detection run

pub mod annotate;
pub mod detection;
pub mod image_utils;
pub mod preprocessing;
pub mod yolo;

pub use annotate::DebugImageWriter;
pub use detection::{
    detect_objects, run_detection, Detection, DetectionRecord, ObjectDetector, FAILURE_MESSAGE,
    NO_OBJECTS_MESSAGE,
};
pub use image_utils::{decode_base64_image, decode_image_bytes, detect_format, ImageError, ImageInfo};
pub use yolo::{YoloDetector, YoloParams, COCO_CLASSES};
