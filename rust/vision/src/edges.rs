// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sobel edge detection
//!
//! Convolves the interior of a grayscale buffer with the 3×3 Sobel pair and
//! stores `min(255, sqrt(gx² + gy²))` per pixel. The one-pixel border is
//! never evaluated and stays at zero.

use image::{GrayImage, Luma, RgbaImage};

/// Single-channel edge intensity buffer, same size as its source
pub type EdgeMap = GrayImage;

type Kernel3 = [[f32; 3]; 3];

const SOBEL_KERNEL_X: Kernel3 = [[-1.0, 0.0, 1.0], [-2.0, 0.0, 2.0], [-1.0, 0.0, 1.0]];
const SOBEL_KERNEL_Y: Kernel3 = [[-1.0, -2.0, -1.0], [0.0, 0.0, 0.0], [1.0, 2.0, 1.0]];

/// Edge map of a grayscale pixel buffer (intensity read from the red channel)
pub fn detect_edges(buffer: &RgbaImage) -> EdgeMap {
    let (width, height) = buffer.dimensions();
    sobel_magnitude(width, height, |x, y| buffer.get_pixel(x, y).0[0] as f32)
}

/// Edge map of a single-channel image
pub fn detect_edges_luma(gray: &GrayImage) -> EdgeMap {
    let (width, height) = gray.dimensions();
    sobel_magnitude(width, height, |x, y| gray.get_pixel(x, y).0[0] as f32)
}

fn sobel_magnitude<F>(width: u32, height: u32, sample: F) -> EdgeMap
where
    F: Fn(u32, u32) -> f32,
{
    let mut edges = GrayImage::new(width, height);
    if width < 3 || height < 3 {
        return edges;
    }

    for y in 1..height - 1 {
        for x in 1..width - 1 {
            let mut gx = 0.0f32;
            let mut gy = 0.0f32;

            let rows = SOBEL_KERNEL_X.iter().zip(SOBEL_KERNEL_Y.iter());
            for (ky, (row_x, row_y)) in rows.enumerate() {
                let sy = y + ky as u32 - 1;
                for kx in 0..3 {
                    let value = sample(x + kx as u32 - 1, sy);
                    gx += value * row_x[kx];
                    gy += value * row_y[kx];
                }
            }

            let magnitude = (gx * gx + gy * gy).sqrt().round().min(255.0);
            edges.put_pixel(x, y, Luma([magnitude as u8]));
        }
    }

    tracing::debug!(width, height, "Computed Sobel edge map");
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_uniform_buffer_has_no_edges() {
        let buffer = RgbaImage::from_pixel(16, 12, Rgba([173, 173, 173, 255]));
        let edges = detect_edges(&buffer);

        assert_eq!(edges.dimensions(), (16, 12));
        assert!(edges.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn test_vertical_step_edge() {
        // Left half black, right half white
        let mut gray = GrayImage::from_pixel(8, 5, Luma([255]));
        for y in 0..5 {
            for x in 0..4 {
                gray.put_pixel(x, y, Luma([0]));
            }
        }

        let edges = detect_edges_luma(&gray);

        // Columns straddling the step saturate, flat regions stay dark
        assert_eq!(edges.get_pixel(3, 2).0[0], 255);
        assert_eq!(edges.get_pixel(4, 2).0[0], 255);
        assert_eq!(edges.get_pixel(1, 2).0[0], 0);
        assert_eq!(edges.get_pixel(6, 2).0[0], 0);
    }

    #[test]
    fn test_border_left_at_zero() {
        let mut gray = GrayImage::new(6, 6);
        for (x, y, pixel) in gray.enumerate_pixels_mut() {
            *pixel = Luma([((x * 37 + y * 91) % 256) as u8]);
        }

        let edges = detect_edges_luma(&gray);
        for i in 0..6 {
            assert_eq!(edges.get_pixel(i, 0).0[0], 0);
            assert_eq!(edges.get_pixel(i, 5).0[0], 0);
            assert_eq!(edges.get_pixel(0, i).0[0], 0);
            assert_eq!(edges.get_pixel(5, i).0[0], 0);
        }
    }

    #[test]
    fn test_tiny_buffer() {
        let gray = GrayImage::from_pixel(2, 2, Luma([50]));
        let edges = detect_edges_luma(&gray);
        assert_eq!(edges.dimensions(), (2, 2));
    }
}
