// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection response types

use serde::{Deserialize, Serialize};

use crate::api::errors::{ErrorStatus, FailureResponse};
use crate::vision::DetectionRecord;

/// Response from object detection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DetectionResponse {
    /// Detected objects, or a single sentinel record
    pub detection_result: Vec<DetectionRecord>,
    pub errors: ErrorStatus,
}

impl DetectionResponse {
    pub fn success(detection_result: Vec<DetectionRecord>) -> Self {
        Self {
            detection_result,
            errors: ErrorStatus::none(),
        }
    }
}

impl FailureResponse for DetectionResponse {
    fn failure(message: String) -> Self {
        Self {
            detection_result: vec![DetectionRecord::failed()],
            errors: ErrorStatus::failed(message),
        }
    }
}
