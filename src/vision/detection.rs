// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection adapter
//!
//! Wraps any [`ObjectDetector`] and turns its raw output into the records
//! returned to clients. An image with no detections yields a single
//! "nothing found" record instead of an empty list.

use image::RgbImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::annotate::DebugImageWriter;
use crate::inference::InferenceError;

/// Message carried by the record returned when the model finds nothing
pub const NO_OBJECTS_MESSAGE: &str = "Model could not detect any object in the image";

/// Message carried by the record returned when inference fails
pub const FAILURE_MESSAGE: &str = "An error occurred";

/// One detected object, in original image pixel coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
    /// Confidence score (0.0-1.0)
    pub confidence: f32,
    #[serde(rename = "class")]
    pub class_id: i64,
    pub name: String,
}

impl Detection {
    pub fn width(&self) -> f32 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f32 {
        self.ymax - self.ymin
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    /// Intersection over union with another box
    pub fn iou(&self, other: &Detection) -> f32 {
        let x1 = self.xmin.max(other.xmin);
        let y1 = self.ymin.max(other.ymin);
        let x2 = self.xmax.min(other.xmax);
        let y2 = self.ymax.min(other.ymax);

        let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
        let union = self.area() + other.area() - intersection;

        if union > 0.0 {
            intersection / union
        } else {
            0.0
        }
    }
}

/// An entry of `detection_result`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetectionRecord {
    Object(Detection),
    NoObjects {
        detection_result: String,
    },
    Failed {
        #[serde(rename = "ERROR")]
        error: String,
    },
}

impl DetectionRecord {
    pub fn no_objects() -> Self {
        DetectionRecord::NoObjects {
            detection_result: NO_OBJECTS_MESSAGE.to_string(),
        }
    }

    pub fn failed() -> Self {
        DetectionRecord::Failed {
            error: FAILURE_MESSAGE.to_string(),
        }
    }

    pub fn as_detection(&self) -> Option<&Detection> {
        match self {
            DetectionRecord::Object(detection) => Some(detection),
            _ => None,
        }
    }
}

/// A loaded object-detection model
///
/// Implementations must be callable from several requests at once.
pub trait ObjectDetector: Send + Sync {
    /// Model name reported by `/health`
    fn name(&self) -> &str;

    /// Run the model on an RGB image
    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, InferenceError>;
}

/// Detect objects and map the result into response records
///
/// When `debug_writer` is set an annotated copy of the image is written to
/// disk. Failing to write it is logged and otherwise ignored.
pub fn detect_objects(
    detector: &dyn ObjectDetector,
    image: &RgbImage,
    debug_writer: Option<&DebugImageWriter>,
) -> Result<Vec<DetectionRecord>, InferenceError> {
    let detections = detector.detect(image)?;
    debug!("{} returned {} detections", detector.name(), detections.len());

    if let Some(writer) = debug_writer {
        match writer.save(image, &detections) {
            Ok(path) => debug!("Saved annotated image to {}", path.display()),
            Err(e) => warn!("Failed to save annotated image: {:#}", e),
        }
    }

    if detections.is_empty() {
        return Ok(vec![DetectionRecord::no_objects()]);
    }

    Ok(detections.into_iter().map(DetectionRecord::Object).collect())
}

/// Run [`detect_objects`] on the blocking pool
pub async fn run_detection(
    detector: Arc<dyn ObjectDetector>,
    image: RgbImage,
    debug_writer: Option<Arc<DebugImageWriter>>,
) -> Result<Vec<DetectionRecord>, InferenceError> {
    tokio::task::spawn_blocking(move || {
        detect_objects(detector.as_ref(), &image, debug_writer.as_deref())
    })
    .await?
}
