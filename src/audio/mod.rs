// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Audio decoding for speech translation

pub mod audio_utils;

pub use audio_utils::{
    decode_audio_bytes, decode_base64_audio, AudioBuffer, AudioError, TARGET_SAMPLE_RATE,
};
