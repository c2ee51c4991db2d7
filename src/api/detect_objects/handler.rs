// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection endpoint handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use image::RgbImage;
use tracing::{debug, error, info, warn};

use super::request::DetectionRequestIn;
use super::response::DetectionResponse;
use crate::api::errors::{ApiError, MSG_UNSUPPORTED_IMAGE};
use crate::api::http_server::AppState;
use crate::api::upload::read_file_field;
use crate::vision::{decode_image_bytes, run_detection};

/// POST /detect-objects - Detect objects in a base64-encoded image
///
/// # Request
/// - `image`: Base64-encoded image data (required, `b64_image` also accepted)
///
/// # Response
/// - `detection_result`: one entry per object (`xmin`, `ymin`, `xmax`, `ymax`,
///   `confidence`, `class`, `name`), or a single sentinel entry
/// - `errors`: `{"Errors": "None"}` or `{"error": "<message>"}`
///
/// # Errors
/// - 422 Unprocessable Entity: missing field, bad base64, or not an image
/// - Model failures are reported with 200 and a sentinel body
pub async fn detect_objects_handler(
    State(state): State<AppState>,
    payload: Result<Json<DetectionRequestIn>, JsonRejection>,
) -> Response {
    info!("Object detection called");

    match detect_from_json(&state, payload).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            log_failure(&e);
            e.into_endpoint_response::<DetectionResponse>()
        }
    }
}

/// POST /detect-objects-upload - Detect objects in an uploaded image file
///
/// Expects a multipart form with a `file` field. Always answers 200; an
/// unreadable upload is reported in `errors`.
pub async fn detect_objects_upload_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    info!("Object detection upload called");

    match detect_from_upload(&state, multipart).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => {
            log_failure(&e);
            e.into_endpoint_response::<DetectionResponse>()
        }
    }
}

async fn detect_from_json(
    state: &AppState,
    payload: Result<Json<DetectionRequestIn>, JsonRejection>,
) -> Result<DetectionResponse, ApiError> {
    let Json(body) = payload.map_err(|rejection| ApiError::from_json_rejection(&rejection))?;
    let request = body.validate().map_err(ApiError::Validation)?;

    debug!(
        "Decoded image: {}x{}, {} bytes",
        request.info.width, request.info.height, request.info.size_bytes
    );

    detect(state, request.image).await
}

async fn detect_from_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<DetectionResponse, ApiError> {
    let bytes = read_file_field(multipart).await?;

    let (image, info) = decode_image_bytes(&bytes).map_err(|e| {
        warn!("Uploaded file is not a supported image: {}", e);
        ApiError::UnsupportedFormat(MSG_UNSUPPORTED_IMAGE.to_string())
    })?;

    debug!(
        "Decoded upload: {}x{} {:?}",
        info.width, info.height, info.format
    );

    detect(state, image).await
}

async fn detect(state: &AppState, image: RgbImage) -> Result<DetectionResponse, ApiError> {
    let records = run_detection(state.models.detector(), image, state.debug_writer.clone()).await?;

    let objects = records.iter().filter(|r| r.as_detection().is_some()).count();
    info!("Object detection complete: {} objects", objects);

    Ok(DetectionResponse::success(records))
}

fn log_failure(err: &ApiError) {
    match err {
        ApiError::Validation(_) => warn!("Detection request rejected: {}", err),
        _ => error!("Object detection failed: {}", err),
    }
}
