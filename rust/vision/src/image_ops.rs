// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Image preprocessing for floor plan recognition
//!
//! The pixel buffer is an [`RgbaImage`] owned by a single request. Stages
//! here rewrite it in place; nothing is shared between requests.

use crate::error::{RecognitionError, Result};
use image::imageops::FilterType;
use image::{Rgba, RgbaImage};

/// Build a pixel buffer from raw RGBA (4 bytes/pixel) or RGB (3 bytes/pixel) data
pub fn pixel_buffer_from_raw(data: &[u8], width: u32, height: u32) -> Result<RgbaImage> {
    let pixels = width as usize * height as usize;

    if data.len() == pixels * 4 {
        if let Some(buffer) = RgbaImage::from_raw(width, height, data.to_vec()) {
            return Ok(buffer);
        }
    }

    if data.len() == pixels * 3 {
        let mut buffer = RgbaImage::new(width, height);
        for (pixel, rgb) in buffer.pixels_mut().zip(data.chunks_exact(3)) {
            *pixel = Rgba([rgb[0], rgb[1], rgb[2], 255]);
        }
        return Ok(buffer);
    }

    Err(RecognitionError::InvalidPixelBuffer {
        expected: pixels * 4,
        actual: data.len(),
    })
}

/// Downscale so neither side exceeds `max_dimension`, preserving aspect ratio
///
/// Buffers already within bounds are returned untouched.
pub fn downscale_to_fit(buffer: RgbaImage, max_dimension: u32) -> RgbaImage {
    let (width, height) = buffer.dimensions();
    if width <= max_dimension && height <= max_dimension {
        return buffer;
    }

    let ratio = (max_dimension as f64 / width as f64).min(max_dimension as f64 / height as f64);
    let new_width = ((width as f64 * ratio).floor() as u32).max(1);
    let new_height = ((height as f64 * ratio).floor() as u32).max(1);

    tracing::debug!(
        from_width = width,
        from_height = height,
        to_width = new_width,
        to_height = new_height,
        "Downscaling input"
    );

    image::imageops::resize(&buffer, new_width, new_height, FilterType::Triangle)
}

/// ITU-R BT.601 luminance, rounded to the nearest integer
#[inline]
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let y = 0.299 * r as f64 + 0.587 * g as f64 + 0.114 * b as f64;
    y.round().clamp(0.0, 255.0) as u8
}

/// Overwrite every pixel with its luminance so that R = G = B = Y
///
/// Alpha is left unchanged.
pub fn grayscale_in_place(buffer: &mut RgbaImage) {
    for pixel in buffer.pixels_mut() {
        let [r, g, b, a] = pixel.0;
        let y = luminance(r, g, b);
        *pixel = Rgba([y, y, y, a]);
    }
}

/// Binarize in place: values strictly above `cutoff` become 255, the rest 0
pub fn threshold_in_place(buffer: &mut RgbaImage, cutoff: u8) {
    for pixel in buffer.pixels_mut() {
        let value = if pixel.0[0] > cutoff { 255 } else { 0 };
        pixel.0[0] = value;
        pixel.0[1] = value;
        pixel.0[2] = value;
    }
}
