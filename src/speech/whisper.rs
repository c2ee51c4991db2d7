// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Whisper speech translation via whisper.cpp
//!
//! The context (model weights) is loaded once and shared. Every call gets
//! its own decoder state and runs with `no_context`, so no text from a
//! previous request conditions the next one.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::translation::{SpeechTranslator, Transcription, DEFAULT_TARGET_LANGUAGE};
use crate::audio::{AudioBuffer, TARGET_SAMPLE_RATE};
use crate::inference::InferenceError;

/// Whisper-backed translator (any language into English)
pub struct WhisperTranslator {
    context: WhisperContext,
    model_name: String,
    threads: i32,
}

impl std::fmt::Debug for WhisperTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranslator")
            .field("model_name", &self.model_name)
            .field("threads", &self.threads)
            .finish_non_exhaustive()
    }
}

impl WhisperTranslator {
    /// Load a ggml Whisper model
    ///
    /// # Errors
    /// Returns error if the file is missing or whisper.cpp rejects it.
    pub fn load<P: AsRef<Path>>(model_path: P, threads: usize) -> Result<Self> {
        let model_path = model_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Whisper model not found: {}", model_path.display());
        }

        info!("Loading Whisper model from {}", model_path.display());

        let path_str = model_path
            .to_str()
            .context("Whisper model path is not valid UTF-8")?;

        let context = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| anyhow::anyhow!("{:?}", e))
            .with_context(|| format!("Failed to load Whisper model from {}", model_path.display()))?;

        let model_name = model_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "whisper".to_string());

        info!("Whisper model {} loaded (CPU, {} threads)", model_name, threads);

        Ok(Self {
            context,
            model_name,
            threads: i32::try_from(threads.max(1)).unwrap_or(i32::MAX),
        })
    }

    fn params(&self) -> FullParams<'_, '_> {
        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
        params.set_n_threads(self.threads);
        params.set_translate(true);
        params.set_language(Some("auto"));
        params.set_no_context(true);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params
    }
}

impl SpeechTranslator for WhisperTranslator {
    fn name(&self) -> &str {
        &self.model_name
    }

    fn translate(
        &self,
        audio: &AudioBuffer,
        target_language: &str,
    ) -> Result<Transcription, InferenceError> {
        if target_language != DEFAULT_TARGET_LANGUAGE {
            return Err(InferenceError::UnsupportedTargetLanguage(
                target_language.to_string(),
            ));
        }

        if audio.sample_rate != TARGET_SAMPLE_RATE {
            return Err(InferenceError::InvalidInput(format!(
                "expected {} Hz audio, got {} Hz",
                TARGET_SAMPLE_RATE, audio.sample_rate
            )));
        }

        let mut state = self
            .context
            .create_state()
            .map_err(|e| InferenceError::Model(format!("Failed to create Whisper state: {:?}", e)))?;

        state
            .full(self.params(), &audio.samples)
            .map_err(|e| InferenceError::Model(format!("Whisper inference failed: {:?}", e)))?;

        let segments = state
            .full_n_segments()
            .map_err(|e| InferenceError::Model(format!("Failed to read segments: {:?}", e)))?;

        let mut text = String::new();
        for i in 0..segments {
            let segment = state
                .full_get_segment_text(i)
                .map_err(|e| InferenceError::Model(format!("Failed to read segment {}: {:?}", i, e)))?;
            text.push_str(&segment);
        }

        let lang_id = state
            .full_lang_id_from_state()
            .map_err(|e| InferenceError::Model(format!("Failed to read language: {:?}", e)))?;
        let detected_language = whisper_rs::get_lang_str(lang_id)
            .unwrap_or("unknown")
            .to_string();

        debug!(
            "Whisper produced {} segments, detected language '{}'",
            segments, detected_language
        );

        Ok(Transcription {
            detected_language,
            text: text.trim().to_string(),
        })
    }
}
