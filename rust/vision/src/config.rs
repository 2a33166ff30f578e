// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recognition configuration
//!
//! Every threshold of the pipeline lives here. Defaults reproduce the
//! adaptive detection variant: minimum run length and merge distance are
//! derived from the image size unless pinned explicitly.

use crate::error::{RecognitionError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the wall aggregator folds segments together
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    /// One greedy left-to-right pass; a folded segment is never revisited
    #[default]
    SinglePass,
    /// Repeat the pass over the produced walls until nothing merges
    FixedPoint,
}

impl std::str::FromStr for MergeStrategy {
    type Err = RecognitionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "single_pass" | "single" => Ok(MergeStrategy::SinglePass),
            "fixed_point" | "fixed" => Ok(MergeStrategy::FixedPoint),
            other => {
                let message = format!("unknown merge strategy '{other}'");
                Err(RecognitionError::InvalidConfig(message))
            }
        }
    }
}

/// Parameters of the pixel-to-meter scale estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    /// Externally known meters per pixel; skips estimation when set
    pub explicit: Option<f64>,
    /// Real-world length assumed for an average wall (meters)
    pub assumed_wall_length_m: f64,
    /// Multiplier applied when the real floor area is known
    pub known_area_correction: f64,
}

impl Default for ScaleConfig {
    fn default() -> Self {
        Self {
            explicit: None,
            assumed_wall_length_m: 4.0,
            known_area_correction: 0.8,
        }
    }
}

/// Configuration for the recognition pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognitionConfig {
    /// Inputs larger than this on either side are downscaled first
    pub max_dimension: u32,
    /// Optional binarization cutoff applied after grayscale conversion
    pub binarize_threshold: Option<u8>,
    /// Edge intensity a pixel must exceed to be part of a run
    pub edge_threshold: u8,
    /// Fixed minimum run length in pixels; `None` derives it from image size
    pub min_line_length: Option<u32>,
    /// Lower bound of the adaptive minimum run length
    pub min_line_length_floor: u32,
    /// Fraction of the larger image side used for the adaptive run length
    pub min_line_length_ratio: f64,
    /// Fixed perpendicular merge tolerance in pixels; `None` derives it
    pub merge_distance: Option<f64>,
    /// Lower bound of the adaptive merge distance
    pub merge_distance_floor: f64,
    /// Fraction of the larger image side used for the adaptive merge distance
    pub merge_distance_ratio: f64,
    pub merge_strategy: MergeStrategy,
    /// Walls longer than this (pixels) are classified load-bearing
    pub load_bearing_min_length: f64,
    /// Thickness of load-bearing walls (meters)
    pub load_bearing_thickness: f64,
    /// Thickness of partitions (meters)
    pub partition_thickness: f64,
    /// Horizontal walls closer than this (pixels) share a level
    pub level_tolerance: f64,
    /// Adjacent levels must be further apart than this to bound a room
    pub min_room_height: f64,
    pub scale: ScaleConfig,
    /// Zoom used when rasterizing the first document page
    pub document_render_scale: f32,
    /// Number of leading document pages scanned for metadata text
    pub metadata_max_pages: usize,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            max_dimension: 2048,
            binarize_threshold: None,
            edge_threshold: 100,
            min_line_length: None,
            min_line_length_floor: 40,
            min_line_length_ratio: 0.05,
            merge_distance: None,
            merge_distance_floor: 6.0,
            merge_distance_ratio: 0.003,
            merge_strategy: MergeStrategy::SinglePass,
            load_bearing_min_length: 200.0,
            load_bearing_thickness: 0.4,
            partition_thickness: 0.12,
            level_tolerance: 5.0,
            min_room_height: 20.0,
            scale: ScaleConfig::default(),
            document_render_scale: 2.0,
            metadata_max_pages: 3,
        }
    }
}

impl RecognitionConfig {
    /// Parse a (possibly partial) JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Apply `FLOORSCAN_*` environment overrides; unparseable values are ignored
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_parse::<u32>("FLOORSCAN_MAX_DIMENSION") {
            self.max_dimension = v;
        }
        if let Some(v) = env_parse::<u8>("FLOORSCAN_EDGE_THRESHOLD") {
            self.edge_threshold = v;
        }
        if let Some(v) = env_parse::<MergeStrategy>("FLOORSCAN_MERGE_STRATEGY") {
            self.merge_strategy = v;
        }
        if let Some(v) = env_parse::<f64>("FLOORSCAN_SCALE") {
            self.scale.explicit = Some(v);
        }
        self
    }

    /// Reject values the pipeline cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.max_dimension == 0 {
            return Err(RecognitionError::InvalidConfig(
                "max_dimension must be positive".into(),
            ));
        }
        if self.load_bearing_thickness <= 0.0 || self.partition_thickness <= 0.0 {
            return Err(RecognitionError::InvalidConfig(
                "wall thicknesses must be positive".into(),
            ));
        }
        if self.min_line_length == Some(0) || self.min_line_length_floor == 0 {
            return Err(RecognitionError::InvalidConfig(
                "minimum line length must be positive".into(),
            ));
        }
        if self.scale.assumed_wall_length_m <= 0.0 || self.scale.known_area_correction <= 0.0 {
            return Err(RecognitionError::InvalidConfig(
                "scale parameters must be positive".into(),
            ));
        }
        if self.document_render_scale <= 0.0 {
            return Err(RecognitionError::InvalidConfig(
                "document_render_scale must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Minimum run length for an image of the given size
    pub fn effective_min_line_length(&self, width: u32, height: u32) -> u32 {
        self.min_line_length.unwrap_or_else(|| {
            let larger = width.max(height) as f64;
            let adaptive = (larger * self.min_line_length_ratio).floor() as u32;
            adaptive.max(self.min_line_length_floor)
        })
    }

    /// Perpendicular merge tolerance for an image of the given size
    pub fn effective_merge_distance(&self, width: u32, height: u32) -> f64 {
        self.merge_distance.unwrap_or_else(|| {
            let larger = width.max(height) as f64;
            (larger * self.merge_distance_ratio)
                .floor()
                .max(self.merge_distance_floor)
        })
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adaptive_thresholds() {
        let config = RecognitionConfig::default();

        // Small images hit the floors
        assert_eq!(config.effective_min_line_length(400, 300), 40);
        assert_eq!(config.effective_merge_distance(400, 300), 6.0);

        // Large images scale with the longer side
        assert_eq!(config.effective_min_line_length(2048, 1024), 102);
        assert_eq!(config.effective_merge_distance(1024, 4000), 12.0);
    }

    #[test]
    fn test_fixed_thresholds_win() {
        let config = RecognitionConfig {
            min_line_length: Some(50),
            merge_distance: Some(5.0),
            ..Default::default()
        };
        assert_eq!(config.effective_min_line_length(4000, 4000), 50);
        assert_eq!(config.effective_merge_distance(4000, 4000), 5.0);
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{"edge_threshold": 80, "merge_strategy": "fixed_point"}"#;
        let config = RecognitionConfig::from_json_str(json).unwrap();
        assert_eq!(config.edge_threshold, 80);
        assert_eq!(config.merge_strategy, MergeStrategy::FixedPoint);
        assert_eq!(config.max_dimension, 2048);
        assert_eq!(config.scale.assumed_wall_length_m, 4.0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let json = r#"{"partition_thickness": 0.0}"#;
        let err = RecognitionConfig::from_json_str(json).unwrap_err();
        assert!(matches!(err, RecognitionError::InvalidConfig(_)));

        let err = RecognitionConfig::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, RecognitionError::Json(_)));
    }

    #[test]
    fn test_merge_strategy_from_str() {
        let parse = |s: &str| s.parse::<MergeStrategy>();
        assert_eq!(parse("fixed-point").unwrap(), MergeStrategy::FixedPoint);
        assert_eq!(parse("SINGLE_PASS").unwrap(), MergeStrategy::SinglePass);
        assert!(parse("sometimes").is_err());
    }
}
