// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Speech translation (any language into English) on CPU

pub mod translation;
pub mod whisper;

pub use translation::{
    run_translation, transcribe_and_translate, SpeechTranslator, Transcription,
    DEFAULT_TARGET_LANGUAGE,
};
pub use whisper::WhisperTranslator;
