// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared multipart handling for the upload endpoints

use axum::body::Bytes;
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use tracing::{debug, warn};

use super::errors::{ApiError, MSG_NO_FILE};

/// Form field carrying the uploaded file
pub const FILE_FIELD: &str = "file";

/// Read the `file` field of a multipart upload
///
/// Every failure becomes an in-band [`ApiError::Unknown`] because the upload
/// endpoints always answer 200.
pub async fn read_file_field(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Bytes, ApiError> {
    let mut multipart = multipart.map_err(|rejection| {
        warn!("Rejected multipart request: {}", rejection.body_text());
        ApiError::Unknown(rejection.body_text())
    })?;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        warn!("Failed reading multipart field: {}", e);
        ApiError::Unknown(e.body_text())
    })? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| {
            warn!("Failed reading multipart '{}' field: {}", FILE_FIELD, e);
            ApiError::Unknown(e.body_text())
        })?;

        debug!(
            "Received upload {:?}: {} bytes",
            file_name.as_deref().unwrap_or("<unnamed>"),
            bytes.len()
        );
        return Ok(bytes);
    }

    Err(ApiError::Unknown(MSG_NO_FILE.to_string()))
}
