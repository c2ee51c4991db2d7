// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect_objects;
pub mod errors;
pub mod http_server;
pub mod translate_audio;
pub mod upload;

pub use detect_objects::{
    detect_objects_handler, detect_objects_upload_handler, DetectionRequest, DetectionRequestIn,
    DetectionResponse,
};
pub use errors::{ApiError, ErrorStatus, ValidationDetail, ValidationErrorResponse};
pub use http_server::{create_app, start_server, AppState};
pub use translate_audio::{
    translate_audio_handler, translate_audio_upload_handler, TranslationRequest,
    TranslationRequestIn, TranslationResponse,
};
