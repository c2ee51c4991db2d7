// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for YOLO detection

use image::imageops::FilterType;
use image::RgbImage;
use ndarray::Array4;

/// Square input size of the exported detector
pub const YOLO_INPUT_SIZE: u32 = 640;

/// Grey used for letterbox padding
const PAD_VALUE: f32 = 114.0 / 255.0;

/// How an image was placed inside the square model input
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
}

impl Letterbox {
    /// Map a model-space coordinate back to the original image
    pub fn unmap(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.pad_x) / self.scale, (y - self.pad_y) / self.scale)
    }
}

/// Resize with aspect ratio preserved, pad to a square, and build an
/// NCHW `[1, 3, size, size]` tensor with values in [0, 1]
pub fn letterbox_tensor(image: &RgbImage, target_size: u32) -> (Array4<f32>, Letterbox) {
    let size = target_size as usize;
    let mut tensor = Array4::from_elem((1, 3, size, size), PAD_VALUE);

    let (orig_w, orig_h) = image.dimensions();
    if orig_w == 0 || orig_h == 0 {
        let letterbox = Letterbox {
            scale: 1.0,
            pad_x: 0.0,
            pad_y: 0.0,
        };
        return (tensor, letterbox);
    }

    let scale = (target_size as f32 / orig_w as f32).min(target_size as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).round() as u32).clamp(1, target_size);
    let new_h = ((orig_h as f32 * scale).round() as u32).clamp(1, target_size);

    let resized = image::imageops::resize(image, new_w, new_h, FilterType::Triangle);

    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    for (x, y, pixel) in resized.enumerate_pixels() {
        let tx = (x + pad_x) as usize;
        let ty = (y + pad_y) as usize;
        for c in 0..3 {
            tensor[[0, c, ty, tx]] = pixel[c] as f32 / 255.0;
        }
    }

    let letterbox = Letterbox {
        scale,
        pad_x: pad_x as f32,
        pad_y: pad_y as f32,
    };

    (tensor, letterbox)
}
