// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Speech translation adapter

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::audio::AudioBuffer;
use crate::inference::InferenceError;

/// Language translations are produced in unless a caller asks otherwise
pub const DEFAULT_TARGET_LANGUAGE: &str = "en";

/// Result of one translation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcription {
    /// Language code detected in the source audio (e.g. "fr")
    pub detected_language: String,
    /// Text in the target language
    pub text: String,
}

/// A loaded speech model able to translate audio into text
///
/// Implementations must be callable from several requests at once and must
/// not carry decoder context from one call into the next.
pub trait SpeechTranslator: Send + Sync {
    fn name(&self) -> &str;

    /// Detect the spoken language and translate the speech into `target_language`
    fn translate(
        &self,
        audio: &AudioBuffer,
        target_language: &str,
    ) -> Result<Transcription, InferenceError>;
}

/// Translate audio and return `(detected_language, translation)`
pub fn transcribe_and_translate(
    translator: &dyn SpeechTranslator,
    audio: &AudioBuffer,
    target_language: &str,
) -> Result<Transcription, InferenceError> {
    if audio.samples.is_empty() {
        return Err(InferenceError::InvalidInput("audio has no samples".to_string()));
    }

    debug!(
        "{} translating {:.2}s of audio into '{}'",
        translator.name(),
        audio.duration_secs(),
        target_language
    );

    let transcription = translator.translate(audio, target_language)?;

    Ok(Transcription {
        detected_language: transcription.detected_language.trim().to_string(),
        text: transcription.text.trim().to_string(),
    })
}

/// Run [`transcribe_and_translate`] on the blocking pool
pub async fn run_translation(
    translator: Arc<dyn SpeechTranslator>,
    audio: AudioBuffer,
    target_language: String,
) -> Result<Transcription, InferenceError> {
    tokio::task::spawn_blocking(move || {
        transcribe_and_translate(translator.as_ref(), &audio, &target_language)
    })
    .await?
}
