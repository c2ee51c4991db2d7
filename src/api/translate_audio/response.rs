// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Translation response types

use serde::{Deserialize, Serialize};

use crate::api::errors::{ErrorStatus, FailureResponse};
use crate::speech::Transcription;

/// Response from speech translation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResponse {
    /// Language code detected in the audio
    pub detected_language: String,
    /// Translated text
    pub translation: String,
    pub errors: ErrorStatus,
}

impl From<Transcription> for TranslationResponse {
    fn from(transcription: Transcription) -> Self {
        Self {
            detected_language: transcription.detected_language,
            translation: transcription.text,
            errors: ErrorStatus::none(),
        }
    }
}

impl FailureResponse for TranslationResponse {
    fn failure(message: String) -> Self {
        Self {
            detected_language: String::new(),
            translation: String::new(),
            errors: ErrorStatus::failed(message),
        }
    }
}
