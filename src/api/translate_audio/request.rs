// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Translation request types and validation

use serde::{Deserialize, Serialize};

use crate::api::errors::{ValidationDetail, MSG_INVALID_BASE64};
use crate::audio::audio_utils::{decode_base64_audio, AudioBuffer, AudioError, MAX_AUDIO_SIZE};
use crate::speech::DEFAULT_TARGET_LANGUAGE;

const AUDIO_FIELD: &str = "audio";

fn default_target_language() -> String {
    DEFAULT_TARGET_LANGUAGE.to_string()
}

/// Request body as received
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationRequestIn {
    /// Base64-encoded WAV data
    #[serde(default, alias = "b64_audio")]
    pub audio: Option<String>,

    /// Language to translate into
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

impl Default for TranslationRequestIn {
    fn default() -> Self {
        Self {
            audio: None,
            target_language: default_target_language(),
        }
    }
}

/// Validated request, holding the decoded audio
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    pub audio: AudioBuffer,
    pub target_language: String,
}

impl TranslationRequestIn {
    /// Decode and check the payload
    pub fn validate(&self) -> Result<TranslationRequest, Vec<ValidationDetail>> {
        let payload = self
            .audio
            .as_deref()
            .ok_or_else(|| vec![ValidationDetail::missing(AUDIO_FIELD)])?;

        let audio = decode_base64_audio(payload)
            .map_err(|e| vec![ValidationDetail::body_field(AUDIO_FIELD, audio_error_message(&e))])?;

        Ok(TranslationRequest {
            audio,
            target_language: self.target_language.trim().to_lowercase(),
        })
    }
}

fn audio_error_message(err: &AudioError) -> String {
    match err {
        AudioError::InvalidBase64(_) | AudioError::EmptyData => MSG_INVALID_BASE64.to_string(),
        AudioError::TooLarge(..) => {
            format!("audio exceeds maximum size of {} bytes", MAX_AUDIO_SIZE)
        }
        AudioError::UnsupportedFormat | AudioError::DecodeFailed(_) => {
            "No audio/invalid audio found".to_string()
        }
    }
}
