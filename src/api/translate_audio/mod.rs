// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Speech translation API endpoints
//!
//! Provides POST /translate-audio (base64 JSON) and POST /translate-audio-upload
//! (multipart file).

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{translate_audio_handler, translate_audio_upload_handler};
pub use request::{TranslationRequest, TranslationRequestIn};
pub use response::TranslationResponse;
