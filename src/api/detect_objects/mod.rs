// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Object detection API endpoints
//!
//! Provides POST /detect-objects (base64 JSON) and POST /detect-objects-upload
//! (multipart file).

pub mod handler;
pub mod request;
pub mod response;

pub use handler::{detect_objects_handler, detect_objects_upload_handler};
pub use request::{DetectionRequest, DetectionRequestIn};
pub use response::DetectionResponse;
