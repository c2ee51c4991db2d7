// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod audio;
pub mod config;
pub mod inference;
pub mod models;
pub mod speech;
pub mod version;
pub mod vision;

pub use api::{create_app, start_server, AppState};
pub use config::ServerConfig;
pub use inference::InferenceError;
pub use models::ModelRegistry;
pub use speech::{SpeechTranslator, Transcription};
pub use vision::{Detection, DetectionRecord, ObjectDetector};
