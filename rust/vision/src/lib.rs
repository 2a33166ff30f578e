// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Floor plan recognition
//!
//! Turns a raster floor plan into metric walls and rooms:
//! 1. Preprocessing (downscale, grayscale) and Sobel edge detection
//! 2. Row/column run extraction and greedy wall aggregation
//! 3. Rectangular room detection between horizontal wall levels
//! 4. Pixel-to-meter scale estimation and textual output
//!
//! Documents are supported through an injected [`DocumentRenderer`]; their
//! text feeds the area, ceiling-height and address heuristics.
//!
//! # Usage
//!
//! ```rust,ignore
//! use floorscan_vision::{Recognizer, RecognitionConfig};
//!
//! let recognizer = Recognizer::new(RecognitionConfig::default())?;
//! let result = recognizer.recognize_path("plan.png").await;
//! println!("{}", serde_json::to_string_pretty(&result)?);
//! ```

pub mod config;
pub mod contract;
pub mod edges;
pub mod error;
pub mod format;
pub mod image_ops;
pub mod line_ops;
pub mod metadata;
pub mod pipeline;
pub mod result;
pub mod room_detector;
pub mod scale;
pub mod scene;
pub mod source;
pub mod types;
pub mod wall_detector;

// Re-export commonly used types and functions
pub use config::{MergeStrategy, RecognitionConfig, ScaleConfig};
pub use contract::{PlanningProjectInput, PlanningProjectResponse};
pub use edges::{detect_edges, EdgeMap};
pub use error::{RecognitionError, Result};
pub use format::{format_rooms, format_walls, parse_rooms, parse_walls};
pub use line_ops::extract_lines;
pub use metadata::{parse_metadata, PlanMetadata};
pub use pipeline::{recognize_edge_map, recognize_pixels, recognize_raw, Recognizer};
pub use result::{RecognitionResult, RecognizedPlan};
pub use room_detector::detect_rooms;
pub use scale::estimate_scale;
pub use scene::{OpeningKind, OpeningRecord, SceneInput, DEFAULT_STOREY_HEIGHT};
pub use source::{DocumentRenderer, LoadedSource, SourceKind, SourceLoader};
pub use types::{
    LineSegment, Orientation, PlanStats, Point2D, RoomPolygon, ScaleFactor, WallSegment,
};
pub use wall_detector::aggregate_walls;
