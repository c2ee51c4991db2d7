// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Speech translation endpoint handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use tracing::{debug, error, info, warn};

use super::request::TranslationRequestIn;
use super::response::TranslationResponse;
use crate::api::errors::{ApiError, MSG_UNSUPPORTED_AUDIO};
use crate::api::http_server::AppState;
use crate::api::upload::read_file_field;
use crate::audio::{decode_audio_bytes, AudioBuffer};
use crate::speech::{run_translation, DEFAULT_TARGET_LANGUAGE};

/// POST /translate-audio - Translate base64-encoded speech into English
///
/// # Request
/// - `audio`: Base64-encoded WAV data (required, `b64_audio` also accepted)
/// - `targetLanguage`: defaults to "en", the only supported target
///
/// # Response
/// - `detectedLanguage`: language spoken in the audio
/// - `translation`: translated text
/// - `errors`: `{"Errors": "None"}` or `{"error": "<message>"}`
///
/// # Errors
/// - 422 Unprocessable Entity: missing field, bad base64, or not audio
/// - Model failures are reported with 200 and empty strings
pub async fn translate_audio_handler(
    State(state): State<AppState>,
    payload: Result<Json<TranslationRequestIn>, JsonRejection>,
) -> Response {
    info!("Translate audio called");

    match translate_from_json(&state, payload).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            log_failure(&e);
            e.into_endpoint_response::<TranslationResponse>()
        }
    }
}

/// POST /translate-audio-upload - Translate an uploaded WAV file
///
/// Expects a multipart form with a `file` field. Always answers 200.
pub async fn translate_audio_upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    info!("Translate audio upload called");

    match translate_from_upload(&state, multipart).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            log_failure(&e);
            e.into_endpoint_response::<TranslationResponse>()
        }
    }
}

async fn translate_from_json(
    state: &AppState,
    payload: Result<Json<TranslationRequestIn>, JsonRejection>,
) -> Result<TranslationResponse, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::from_json_rejection(&rejection))?;
    let request = body.validate().map_err(ApiError::Validation)?;

    translate(state, request.audio, request.target_language).await
}

async fn translate_from_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<TranslationResponse, ApiError> {
    let bytes = read_file_field(multipart).await?;

    let audio = decode_audio_bytes(&bytes).map_err(|e| {
        warn!("Uploaded file is not a supported audio file: {}", e);
        ApiError::UnsupportedFormat(MSG_UNSUPPORTED_AUDIO.to_string())
    })?;

    translate(state, audio, DEFAULT_TARGET_LANGUAGE.to_string()).await
}

async fn translate(
    state: &AppState,
    audio: AudioBuffer,
    target_language: String,
) -> Result<TranslationResponse, ApiError> {
    debug!(
        "Translating {:.2}s of audio ({} Hz x{} source)",
        audio.duration_secs(),
        audio.source_sample_rate,
        audio.source_channels
    );

    let transcription = run_translation(state.models.translator(), audio, target_language).await?;

    info!(
        "Translation complete: detected '{}', {} chars",
        transcription.detected_language,
        transcription.text.len()
    );

    Ok(TranslationResponse::from(transcription))
}

fn log_failure(err: &ApiError) {
    match err {
        ApiError::Validation(_) => warn!("Translation request rejected: {}", err),
        _ => error!("Audio translation failed: {}", err),
    }
}
