// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::inference::InferenceError;

pub const MSG_INVALID_BASE64: &str = "Invalid base64 string";
pub const MSG_FIELD_REQUIRED: &str = "field required";
pub const MSG_UNSUPPORTED_IMAGE: &str = "File uploaded is not a supported image";
pub const MSG_UNSUPPORTED_AUDIO: &str = "File uploaded is not a supported audio file";
pub const MSG_NO_FILE: &str = "No file uploaded";

/// One failing field in a 422 response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationDetail {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub error_type: String,
}

impl ValidationDetail {
    /// Invalid value for a top-level body field
    pub fn body_field(field: &str, msg: impl Into<String>) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: msg.into(),
            error_type: "value_error".to_string(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self {
            loc: vec!["body".to_string(), field.to_string()],
            msg: MSG_FIELD_REQUIRED.to_string(),
            error_type: "value_error.missing".to_string(),
        }
    }

    /// The body as a whole could not be read
    pub fn body(msg: impl Into<String>, error_type: &str) -> Self {
        Self {
            loc: vec!["body".to_string()],
            msg: msg.into(),
            error_type: error_type.to_string(),
        }
    }
}

/// Body of every HTTP 422 response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationErrorResponse {
    pub detail: Vec<ValidationDetail>,
}

impl IntoResponse for ValidationErrorResponse {
    fn into_response(self) -> Response {
        (StatusCode::UNPROCESSABLE_ENTITY, Json(self)).into_response()
    }
}

/// `errors` field shared by both response schemas
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ErrorStatus {
    None {
        #[serde(rename = "Errors")]
        errors: String,
    },
    Failed {
        error: String,
    },
}

impl ErrorStatus {
    pub fn none() -> Self {
        ErrorStatus::None {
            errors: "None".to_string(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        ErrorStatus::Failed {
            error: message.into(),
        }
    }
}

impl Default for ErrorStatus {
    fn default() -> Self {
        Self::none()
    }
}

/// A response schema that can carry a failure in-band with HTTP 200
pub trait FailureResponse: Serialize {
    fn failure(message: String) -> Self;
}

/// Every way a request can end other than success
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Rejected before inference (HTTP 422)
    Validation(Vec<ValidationDetail>),
    /// Uploaded file is not a format the endpoint accepts
    UnsupportedFormat(String),
    /// The model raised an error
    InferenceFailure(String),
    Unknown(String),
}

impl ApiError {
    /// Map a JSON extractor rejection into the 422 detail list
    pub fn from_json_rejection(rejection: &JsonRejection) -> Self {
        let detail = match rejection {
            JsonRejection::JsonSyntaxError(_) => {
                ValidationDetail::body(rejection.body_text(), "value_error.jsondecode")
            }
            JsonRejection::JsonDataError(_) => {
                ValidationDetail::body(rejection.body_text(), "type_error")
            }
            JsonRejection::MissingJsonContentType(_) => {
                ValidationDetail::body(rejection.body_text(), "value_error.content_type")
            }
            _ => ValidationDetail::body(rejection.body_text(), "value_error"),
        };
        ApiError::Validation(vec![detail])
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::UnsupportedFormat(_)
            | ApiError::InferenceFailure(_)
            | ApiError::Unknown(_) => StatusCode::OK,
        }
    }

    /// Text placed in `errors.error` of a failure body
    pub fn failure_message(&self) -> String {
        match self {
            ApiError::Validation(details) => details
                .first()
                .map(|d| d.msg.clone())
                .unwrap_or_else(|| "Validation failed".to_string()),
            ApiError::UnsupportedFormat(msg)
            | ApiError::InferenceFailure(msg)
            | ApiError::Unknown(msg) => msg.clone(),
        }
    }

    /// Build the HTTP response for an endpoint whose body schema is `R`
    pub fn into_endpoint_response<R: FailureResponse>(self) -> Response {
        match self {
            ApiError::Validation(detail) => ValidationErrorResponse { detail }.into_response(),
            other => {
                let status = other.status_code();
                (status, Json(R::failure(other.failure_message()))).into_response()
            }
        }
    }
}

impl From<InferenceError> for ApiError {
    fn from(err: InferenceError) -> Self {
        match err {
            InferenceError::Join(msg) => ApiError::Unknown(msg),
            other => ApiError::InferenceFailure(other.to_string()),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Validation(details) => {
                let fields: Vec<String> = details
                    .iter()
                    .map(|d| format!("{}: {}", d.loc.join("."), d.msg))
                    .collect();
                write!(f, "Validation error: {}", fields.join("; "))
            }
            ApiError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            ApiError::InferenceFailure(msg) => write!(f, "Inference failed: {}", msg),
            ApiError::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}
