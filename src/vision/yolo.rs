// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! YOLOv5 object detector on ONNX Runtime
//!
//! Expects a model exported with `export.py --include onnx`: one input of
//! shape `[1, 3, 640, 640]` and one output of shape `[1, N, 5 + classes]`
//! holding `cx, cy, w, h, objectness, class scores...` per candidate.

use anyhow::{Context, Result};
use image::RgbImage;
use ndarray::ArrayViewD;
use ort::execution_providers::CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};

use super::detection::{Detection, ObjectDetector};
use super::preprocessing::{letterbox_tensor, Letterbox, YOLO_INPUT_SIZE};
use crate::inference::InferenceError;

/// COCO class names, indexed by class id
pub const COCO_CLASSES: [&str; 80] = [
    "person", "bicycle", "car", "motorcycle", "airplane", "bus", "train", "truck", "boat",
    "traffic light", "fire hydrant", "stop sign", "parking meter", "bench", "bird", "cat",
    "dog", "horse", "sheep", "cow", "elephant", "bear", "zebra", "giraffe", "backpack",
    "umbrella", "handbag", "tie", "suitcase", "frisbee", "skis", "snowboard", "sports ball",
    "kite", "baseball bat", "baseball glove", "skateboard", "surfboard", "tennis racket",
    "bottle", "wine glass", "cup", "fork", "knife", "spoon", "bowl", "banana", "apple",
    "sandwich", "orange", "broccoli", "carrot", "hot dog", "pizza", "donut", "cake", "chair",
    "couch", "potted plant", "bed", "dining table", "toilet", "tv", "laptop", "mouse",
    "remote", "keyboard", "cell phone", "microwave", "oven", "toaster", "sink",
    "refrigerator", "book", "clock", "vase", "scissors", "teddy bear", "hair drier",
    "toothbrush",
];

/// Post-processing parameters
#[derive(Debug, Clone)]
pub struct YoloParams {
    pub input_size: u32,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub max_detections: usize,
    pub intra_threads: usize,
}

impl Default for YoloParams {
    fn default() -> Self {
        Self {
            input_size: YOLO_INPUT_SIZE,
            confidence_threshold: 0.25,
            iou_threshold: 0.45,
            max_detections: 1000,
            intra_threads: 4,
        }
    }
}

/// YOLOv5 detector
#[derive(Clone)]
pub struct YoloDetector {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    input_name: String,
    model_name: String,
    params: YoloParams,
}

impl std::fmt::Debug for YoloDetector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoloDetector")
            .field("input_name", &self.input_name)
            .field("model_name", &self.model_name)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl YoloDetector {
    /// Load the detector from an ONNX file
    ///
    /// # Errors
    /// Returns error if the file is missing or ONNX Runtime cannot load it.
    pub fn load<P: AsRef<Path>>(model_path: P, params: YoloParams) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Detector model not found: {}", model_path.display());
        }

        info!("Loading object detector from {}", model_path.display());

        let session = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .context("Failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(params.intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path)
            .context(format!(
                "Failed to load detector model from {}",
                model_path.display()
            ))?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .unwrap_or_else(|| "images".to_string());

        if let Some(input) = session.inputs.first() {
            debug!("Detector input shape: {:?}", input.input_type);
        }

        let model_name = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "yolov5".to_string());

        info!("Object detector {} loaded (CPU)", model_name);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            input_name,
            model_name,
            params,
        })
    }

}

impl ObjectDetector for YoloDetector {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>, InferenceError> {
        let (orig_w, orig_h) = image.dimensions();
        if orig_w == 0 || orig_h == 0 {
            return Err(InferenceError::InvalidInput("image has no pixels".to_string()));
        }

        let (input, letterbox) = letterbox_tensor(image, self.params.input_size);

        // Copy the output out so the session is released before post-processing
        let output = {
            let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);

            let input_value = Value::from_array(input).map_err(|e| {
                InferenceError::Model(format!("Failed to create input tensor: {}", e))
            })?;

            let outputs = session
                .run(ort::inputs![&self.input_name => input_value])
                .map_err(|e| InferenceError::Model(format!("Detection inference failed: {}", e)))?;

            let extracted = outputs[0].try_extract_array::<f32>().map_err(|e| {
                InferenceError::Model(format!("Failed to extract output tensor: {}", e))
            })?;
            extracted.to_owned()
        };

        decode_predictions(output.view(), &letterbox, orig_w, orig_h, &self.params)
    }
}

/// Turn raw YOLOv5 output into detections in original image coordinates
pub fn decode_predictions(
    output: ArrayViewD<f32>,
    letterbox: &Letterbox,
    orig_w: u32,
    orig_h: u32,
    params: &YoloParams,
) -> Result<Vec<Detection>, InferenceError> {
    let shape = output.shape().to_vec();
    let rows = match shape.as_slice() {
        [1, n, _] => *n,
        [n, _] => *n,
        _ => {
            return Err(InferenceError::Model(format!(
                "Unexpected detector output shape: {:?}",
                shape
            )))
        }
    };

    let stride = shape[shape.len() - 1];
    if stride < 6 {
        return Err(InferenceError::Model(format!(
            "Detector output has {} values per row, expected at least 6",
            stride
        )));
    }

    let data: Vec<f32> = output.iter().copied().collect();
    let max_x = orig_w as f32;
    let max_y = orig_h as f32;

    let mut candidates = Vec::new();
    for row in data.chunks_exact(stride).take(rows) {
        if !row[..5].iter().all(|v| v.is_finite()) {
            continue;
        }

        let objectness = row[4];
        if objectness < params.confidence_threshold {
            continue;
        }

        let (class_id, class_score) = row[5..]
            .iter()
            .copied()
            .enumerate()
            .fold((0usize, f32::MIN), |best, (id, score)| {
                if score > best.1 {
                    (id, score)
                } else {
                    best
                }
            });

        if !class_score.is_finite() {
            continue;
        }

        let confidence = (objectness * class_score).clamp(0.0, 1.0);
        if confidence < params.confidence_threshold {
            continue;
        }

        let (cx, cy, w, h) = (row[0], row[1], row[2], row[3]);
        let (x1, y1) = letterbox.unmap(cx - w / 2.0, cy - h / 2.0);
        let (x2, y2) = letterbox.unmap(cx + w / 2.0, cy + h / 2.0);

        let xmin = x1.max(0.0).min(max_x);
        let ymin = y1.max(0.0).min(max_y);
        let xmax = x2.min(max_x).max(xmin);
        let ymax = y2.min(max_y).max(ymin);

        candidates.push(Detection {
            xmin,
            ymin,
            xmax,
            ymax,
            confidence,
            class_id: class_id as i64,
            name: class_name(class_id),
        });
    }

    let mut detections = non_max_suppression(candidates, params.iou_threshold);
    detections.truncate(params.max_detections);

    Ok(detections)
}

/// Class-aware non-maximum suppression, highest confidence first
pub fn non_max_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());
    for candidate in detections {
        let suppressed = kept.iter().any(|k| {
            k.class_id == candidate.class_id && k.iou(&candidate) > iou_threshold
        });
        if !suppressed {
            kept.push(candidate);
        }
    }

    kept
}

fn class_name(class_id: usize) -> String {
    COCO_CLASSES
        .get(class_id)
        .map(|name| name.to_string())
        .unwrap_or_else(|| format!("class_{}", class_id))
}
