// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use thiserror::Error;

/// Failure raised while a request is inside a model adapter
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("{0}")]
    Model(String),

    #[error("invalid model input: {0}")]
    InvalidInput(String),

    #[error("translation into '{0}' is not supported, only 'en' is available")]
    UnsupportedTargetLanguage(String),

    #[error("inference task failed: {0}")]
    Join(String),
}

impl From<tokio::task::JoinError> for InferenceError {
    fn from(err: tokio::task::JoinError) -> Self {
        InferenceError::Join(err.to_string())
    }
}
