// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Process-wide model handles
//!
//! Both models are loaded once at startup and shared read-only with every
//! request through [`crate::api::http_server::AppState`].

use anyhow::{Context, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::config::ServerConfig;
use crate::speech::{SpeechTranslator, WhisperTranslator};
use crate::vision::{ObjectDetector, YoloDetector, YoloParams};

/// Information about a loaded model
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ModelInfo {
    pub name: String,
    /// Model type (detector, translator)
    pub model_type: String,
}

/// Loaded detector and translator
#[derive(Clone)]
pub struct ModelRegistry {
    detector: Arc<dyn ObjectDetector>,
    translator: Arc<dyn SpeechTranslator>,
}

impl ModelRegistry {
    /// Load both models from the configured paths
    ///
    /// # Errors
    /// Fails if either model cannot be loaded; the server does not start
    /// without both.
    pub fn load(config: &ServerConfig) -> Result<Self> {
        let params = YoloParams {
            confidence_threshold: config.confidence_threshold,
            iou_threshold: config.iou_threshold,
            max_detections: config.max_detections,
            intra_threads: config.detector_threads,
            ..YoloParams::default()
        };

        let detector = YoloDetector::load(&config.detector_model, params)
            .context("Failed to load object detection model")?;

        let translator = WhisperTranslator::load(&config.whisper_model, config.whisper_threads)
            .context("Failed to load speech translation model")?;

        let registry = Self::from_parts(Arc::new(detector), Arc::new(translator));
        info!(
            "✅ Models ready: detector={}, translator={}",
            registry.detector.name(),
            registry.translator.name()
        );

        Ok(registry)
    }

    /// Build a registry from already constructed models
    pub fn from_parts(
        detector: Arc<dyn ObjectDetector>,
        translator: Arc<dyn SpeechTranslator>,
    ) -> Self {
        Self {
            detector,
            translator,
        }
    }

    pub fn detector(&self) -> Arc<dyn ObjectDetector> {
        Arc::clone(&self.detector)
    }

    pub fn translator(&self) -> Arc<dyn SpeechTranslator> {
        Arc::clone(&self.translator)
    }

    /// List loaded models
    pub fn list_models(&self) -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                name: self.detector.name().to_string(),
                model_type: "detector".to_string(),
            },
            ModelInfo {
                name: self.translator.name().to_string(),
                model_type: "translator".to_string(),
            },
        ]
    }
}

impl std::fmt::Debug for ModelRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelRegistry")
            .field("detector", &self.detector.name())
            .field("translator", &self.translator.name())
            .finish()
    }
}
