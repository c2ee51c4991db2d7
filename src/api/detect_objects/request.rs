// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection request types and validation

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::api::errors::{ValidationDetail, MSG_INVALID_BASE64};
use crate::vision::image_utils::{decode_base64_image, ImageError, ImageInfo, MAX_IMAGE_SIZE};

const IMAGE_FIELD: &str = "image";

/// Request body as received
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DetectionRequestIn {
    /// Base64-encoded image data
    #[serde(default, alias = "b64_image")]
    pub image: Option<String>,
}

/// Validated request, holding the decoded image
#[derive(Debug, Clone)]
pub struct DetectionRequest {
    pub image: RgbImage,
    pub info: ImageInfo,
}

impl DetectionRequestIn {
    /// Decode and check the payload
    ///
    /// The image is decoded exactly once here and carried forward.
    pub fn validate(&self) -> Result<DetectionRequest, Vec<ValidationDetail>> {
        let payload = self
            .image
            .as_deref()
            .ok_or_else(|| vec![ValidationDetail::missing(IMAGE_FIELD)])?;

        let (image, info) = decode_base64_image(payload)
            .map_err(|e| vec![ValidationDetail::body_field(IMAGE_FIELD, image_error_message(&e))])?;

        Ok(DetectionRequest { image, info })
    }
}

fn image_error_message(err: &ImageError) -> String {
    match err {
        ImageError::InvalidBase64(_) | ImageError::EmptyData => MSG_INVALID_BASE64.to_string(),
        ImageError::TooLarge(..) => {
            format!("image exceeds maximum size of {} bytes", MAX_IMAGE_SIZE)
        }
        ImageError::UnsupportedFormat | ImageError::DecodeFailed(_) => {
            "No image/invalid image found".to_string()
        }
    }
}
