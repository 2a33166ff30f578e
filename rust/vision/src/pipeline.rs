// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recognition pipeline
//!
//! Stages run strictly in sequence on a buffer owned by the current request:
//!
//! 1. Preprocess (downscale, grayscale, optional binarization)
//! 2. Sobel edge detection
//! 3. Row/column run extraction
//! 4. Wall aggregation and classification
//! 5. Room detection
//! 6. Scale estimation
//!
//! Reading the source is the only asynchronous step and happens before
//! stage 1. Once the synchronous part starts it runs to completion.

use crate::config::RecognitionConfig;
use crate::edges::{detect_edges, EdgeMap};
use crate::error::{RecognitionError, Result};
use crate::image_ops::{
    downscale_to_fit, grayscale_in_place, pixel_buffer_from_raw, threshold_in_place,
};
use crate::line_ops::extract_lines;
use crate::metadata::PlanMetadata;
use crate::result::{RecognitionResult, RecognizedPlan};
use crate::room_detector::detect_rooms;
use crate::scale::estimate_scale;
use crate::source::{DocumentRenderer, LoadedSource, SourceLoader};
use crate::wall_detector::aggregate_walls;
use image::RgbaImage;
use std::path::Path;
use std::sync::Arc;

/// Run the full pipeline on a decoded pixel buffer
pub fn recognize_pixels(
    pixels: RgbaImage,
    metadata: &PlanMetadata,
    config: &RecognitionConfig,
) -> Result<RecognizedPlan> {
    // Step 1: Preprocess
    let mut buffer = downscale_to_fit(pixels, config.max_dimension);
    grayscale_in_place(&mut buffer);
    if let Some(cutoff) = config.binarize_threshold {
        threshold_in_place(&mut buffer, cutoff);
    }

    // Step 2: Edges
    let edges = detect_edges(&buffer);
    drop(buffer);

    recognize_edge_map(&edges, metadata, config)
}

/// Run the pipeline on raw RGBA or RGB bytes
pub fn recognize_raw(
    data: &[u8],
    width: u32,
    height: u32,
    metadata: &PlanMetadata,
    config: &RecognitionConfig,
) -> Result<RecognizedPlan> {
    let pixels = pixel_buffer_from_raw(data, width, height)?;
    recognize_pixels(pixels, metadata, config)
}

/// Run the stages after edge detection
///
/// Fails with [`RecognitionError::NoLinesDetected`] when the edge map holds
/// no run long enough; an empty plan is never reported as a success.
pub fn recognize_edge_map(
    edges: &EdgeMap,
    metadata: &PlanMetadata,
    config: &RecognitionConfig,
) -> Result<RecognizedPlan> {
    let (width, height) = edges.dimensions();

    // Step 3: Lines
    let min_length = config.effective_min_line_length(width, height);
    let lines = extract_lines(edges, min_length, config.edge_threshold);
    if lines.is_empty() {
        tracing::debug!(width, height, min_length, "No runs above minimum length");
        return Err(RecognitionError::NoLinesDetected);
    }

    // Step 4: Walls
    let merge_distance = config.effective_merge_distance(width, height);
    let walls = aggregate_walls(&lines, merge_distance, config);

    // Step 5 and 6 both read the wall list only
    let rooms = detect_rooms(&walls, width, height, config);
    let scale = estimate_scale(&walls, metadata.area, config.scale.explicit, &config.scale);

    Ok(RecognizedPlan {
        lines_found: lines.len(),
        walls,
        rooms,
        scale,
        metadata: metadata.clone(),
        image_width: width,
        image_height: height,
    })
}

/// Loads plan sources and recognizes them
///
/// Each call owns its buffers, so one recognizer can serve concurrent
/// requests.
#[derive(Clone)]
pub struct Recognizer {
    config: RecognitionConfig,
    loader: SourceLoader,
    known_area: Option<f64>,
}

impl Default for Recognizer {
    fn default() -> Self {
        Self::with_valid_config(RecognitionConfig::default())
    }
}

impl Recognizer {
    /// Build a recognizer, rejecting configs that fail
    /// [`RecognitionConfig::validate`]
    pub fn new(config: RecognitionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: RecognitionConfig) -> Self {
        Self {
            loader: SourceLoader::from_config(&config),
            config,
            known_area: None,
        }
    }

    /// Use `renderer` for document inputs
    pub fn with_renderer(mut self, renderer: Arc<dyn DocumentRenderer>) -> Self {
        self.loader = self.loader.with_renderer(renderer);
        self
    }

    /// Floor area (m²) known from outside the source; overrides document metadata
    pub fn with_known_area(mut self, area: Option<f64>) -> Self {
        self.known_area = area.filter(|a| *a > 0.0);
        self
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    /// Read and decode a source without recognizing it
    pub async fn load(&self, path: impl AsRef<Path>) -> Result<LoadedSource> {
        self.loader.load_path(path).await
    }

    /// Recognize an already loaded source
    pub fn recognize_source(&self, source: LoadedSource) -> Result<RecognizedPlan> {
        let mut metadata = source.metadata;
        if self.known_area.is_some() {
            metadata.area = self.known_area;
        }

        let (width, height) = source.pixels.dimensions();
        let plan = recognize_pixels(source.pixels, &metadata, &self.config)?;

        tracing::info!(
            width,
            height,
            lines = plan.lines_found,
            walls = plan.walls.len(),
            rooms = plan.rooms.len(),
            scale = plan.scale.value(),
            "Plan recognized"
        );
        Ok(plan)
    }

    pub async fn plan_from_path(&self, path: impl AsRef<Path>) -> Result<RecognizedPlan> {
        let source = self.load(path).await?;
        self.recognize_source(source)
    }

    pub fn plan_from_bytes(&self, name: &str, bytes: &[u8]) -> Result<RecognizedPlan> {
        let source = self.loader.load_bytes(name, bytes)?;
        self.recognize_source(source)
    }

    /// Recognize a file, reporting any failure inside the result
    pub async fn recognize_path(&self, path: impl AsRef<Path>) -> RecognitionResult {
        RecognitionResult::from_outcome(self.plan_from_path(path).await)
    }

    /// Recognize in-memory bytes identified by a file name or mime type
    pub fn recognize_bytes(&self, name: &str, bytes: &[u8]) -> RecognitionResult {
        RecognitionResult::from_outcome(self.plan_from_bytes(name, bytes))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba};

    fn draw_outline(img: &mut RgbaImage, left: u32, top: u32, right: u32, bottom: u32) {
        for x in left..=right {
            img.put_pixel(x, top, Rgba([0, 0, 0, 255]));
            img.put_pixel(x, bottom, Rgba([0, 0, 0, 255]));
        }
        for y in top..=bottom {
            img.put_pixel(left, y, Rgba([0, 0, 0, 255]));
            img.put_pixel(right, y, Rgba([0, 0, 0, 255]));
        }
    }

    /// White 400x300 canvas with a 1-pixel black rectangle outline
    fn outlined_rectangle() -> RgbaImage {
        let mut img = RgbaImage::from_pixel(400, 300, Rgba([255, 255, 255, 255]));
        draw_outline(&mut img, 50, 50, 350, 250);
        img
    }

    #[test]
    fn test_rectangle_from_pixels() {
        let img = outlined_rectangle();
        let config = RecognitionConfig::default();
        let plan = recognize_pixels(img, &PlanMetadata::default(), &config).unwrap();

        assert!(plan.lines_found >= 4);
        assert_eq!(plan.walls.len(), 4);
        assert_eq!(plan.rooms.len(), 1);
        assert_eq!((plan.image_width, plan.image_height), (400, 300));
    }

    #[test]
    fn test_binarized_gray_outline() {
        let mut gray = outlined_rectangle();
        for pixel in gray.pixels_mut().filter(|p| p.0[0] == 0) {
            *pixel = Rgba([100, 100, 100, 255]);
        }

        // Gray 100 is below the cutoff and turns black
        let config = RecognitionConfig {
            binarize_threshold: Some(128),
            ..Default::default()
        };
        let plan = recognize_pixels(gray.clone(), &PlanMetadata::default(), &config).unwrap();
        assert_eq!(plan.walls.len(), 4);
        assert_eq!(plan.rooms.len(), 1);

        // Above the cutoff the outline is wiped out
        let config = RecognitionConfig {
            binarize_threshold: Some(50),
            ..Default::default()
        };
        let err = recognize_pixels(gray, &PlanMetadata::default(), &config).unwrap_err();
        assert!(matches!(err, RecognitionError::NoLinesDetected));
    }

    #[test]
    fn test_edge_map_rectangle() {
        let mut edges = EdgeMap::new(400, 300);
        for x in 50..=350 {
            edges.put_pixel(x, 50, Luma([255]));
            edges.put_pixel(x, 250, Luma([255]));
        }
        for y in 50..=250 {
            edges.put_pixel(50, y, Luma([255]));
            edges.put_pixel(350, y, Luma([255]));
        }

        let config = RecognitionConfig::default();
        let plan = recognize_edge_map(&edges, &PlanMetadata::default(), &config).unwrap();

        assert_eq!(plan.lines_found, 4);
        assert_eq!(plan.walls.len(), 4);
        // 300 px horizontals are load-bearing, 200 px verticals are not
        assert_eq!(plan.walls.iter().filter(|w| w.load_bearing).count(), 2);
        assert_eq!(plan.rooms.len(), 1);
        assert_eq!(plan.rooms[0].area(), 300.0 * 200.0);
    }

    #[test]
    fn test_blank_image_fails() {
        let img = RgbaImage::from_pixel(120, 80, Rgba([255, 255, 255, 255]));
        let config = RecognitionConfig::default();
        let err = recognize_pixels(img, &PlanMetadata::default(), &config).unwrap_err();
        assert!(matches!(err, RecognitionError::NoLinesDetected));
    }

    #[test]
    fn test_explicit_scale_overrides_estimate() {
        let config = RecognitionConfig {
            scale: crate::config::ScaleConfig {
                explicit: Some(0.02),
                ..Default::default()
            },
            ..Default::default()
        };
        let img = outlined_rectangle();
        let plan = recognize_pixels(img, &PlanMetadata::default(), &config).unwrap();
        assert_eq!(plan.scale.value(), 0.02);
    }

    #[test]
    fn test_large_input_is_downscaled() {
        let config = RecognitionConfig {
            max_dimension: 200,
            ..Default::default()
        };
        let mut img = RgbaImage::from_pixel(400, 300, Rgba([255, 255, 255, 255]));
        for inset in 0..4 {
            draw_outline(&mut img, 50 + inset, 50 + inset, 350 - inset, 250 - inset);
        }
        let plan = recognize_pixels(img, &PlanMetadata::default(), &config).unwrap();
        assert_eq!((plan.image_width, plan.image_height), (200, 150));
    }

    #[test]
    fn test_raw_buffer_size_checked() {
        let config = RecognitionConfig::default();
        let err = recognize_raw(&[0u8; 10], 4, 4, &PlanMetadata::default(), &config).unwrap_err();
        assert!(matches!(err, RecognitionError::InvalidPixelBuffer { .. }));
    }

    #[test]
    fn test_recognizer_rejects_invalid_config() {
        let config = RecognitionConfig {
            partition_thickness: 0.0,
            ..Default::default()
        };
        let err = Recognizer::new(config).err().unwrap();
        assert!(matches!(err, RecognitionError::InvalidConfig(_)));

        assert!(Recognizer::new(RecognitionConfig::default()).is_ok());
    }

    #[test]
    fn test_recognizer_bytes_boundary() {
        let recognizer = Recognizer::default();
        let result = recognizer.recognize_bytes("plan.bmp", b"garbage");
        assert!(!result.is_success());
        assert!(result.error().unwrap().contains("Unsupported"));
    }
}
