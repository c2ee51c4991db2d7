// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Annotated debug images for object detection

use anyhow::{Context, Result};
use image::{ImageFormat, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::fs;
use std::path::PathBuf;

use super::detection::Detection;

const BOX_THICKNESS: i32 = 2;

const PALETTE: [Rgb<u8>; 8] = [
    Rgb([255, 56, 56]),
    Rgb([255, 157, 151]),
    Rgb([255, 112, 31]),
    Rgb([255, 178, 29]),
    Rgb([207, 210, 49]),
    Rgb([72, 249, 10]),
    Rgb([26, 147, 52]),
    Rgb([0, 212, 187]),
];

/// Writes detection results drawn over the input image into `<root>/exp/`
#[derive(Debug, Clone)]
pub struct DebugImageWriter {
    root: PathBuf,
}

impl DebugImageWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.root.join("exp")
    }

    /// Draw `detections` on a copy of `image` and write it as JPEG
    ///
    /// Every call creates a new file, so concurrent requests never share one.
    pub fn save(&self, image: &RgbImage, detections: &[Detection]) -> Result<PathBuf> {
        let dir = self.output_dir();
        fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create results directory {}", dir.display()))?;

        let canvas = annotate(image, detections);

        let file_name = format!(
            "{}-{}.jpg",
            chrono::Utc::now().format("%Y%m%dT%H%M%S%.3f"),
            uuid::Uuid::new_v4().simple()
        );
        let path = dir.join(file_name);

        canvas
            .save_with_format(&path, ImageFormat::Jpeg)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        Ok(path)
    }
}

/// Draw each detection box onto a copy of `image`
pub fn annotate(image: &RgbImage, detections: &[Detection]) -> RgbImage {
    let mut canvas = image.clone();
    let (width, height) = canvas.dimensions();

    for detection in detections {
        let color = PALETTE[detection.class_id.unsigned_abs() as usize % PALETTE.len()];

        for offset in 0..BOX_THICKNESS {
            let x = detection.xmin.round() as i32 + offset;
            let y = detection.ymin.round() as i32 + offset;
            let w = (detection.width().round() as i32 - 2 * offset).max(1) as u32;
            let h = (detection.height().round() as i32 - 2 * offset).max(1) as u32;

            if x >= width as i32 || y >= height as i32 {
                continue;
            }

            draw_hollow_rect_mut(&mut canvas, Rect::at(x, y).of_size(w, h), color);
        }
    }

    canvas
}
