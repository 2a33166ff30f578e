// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for floor plan recognition

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A 2D point (simplified for serialization)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_nalgebra(&self) -> Point2<f64> {
        Point2::new(self.x, self.y)
    }

    pub fn from_nalgebra(p: &Point2<f64>) -> Self {
        Self { x: p.x, y: p.y }
    }

    pub fn distance_to(&self, other: &Point2D) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Multiply both coordinates by a meters-per-pixel factor
    pub fn scaled(&self, scale: ScaleFactor) -> Self {
        Self::new(scale.to_meters(self.x), scale.to_meters(self.y))
    }
}

/// Axis a segment or wall runs along
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// Axis-aligned run of edge pixels found by the line extractor
///
/// For a horizontal segment `start.y == end.y`; for a vertical one
/// `start.x == end.x`. `length` counts pixels, so it is one more than the
/// coordinate difference of the endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineSegment {
    pub orientation: Orientation,
    pub start: Point2D,
    pub end: Point2D,
    /// Run length in pixels
    pub length: u32,
}

impl LineSegment {
    /// Build a horizontal run on row `y` covering columns `x0..=x1`
    pub fn horizontal(y: u32, x0: u32, x1: u32) -> Self {
        Self {
            orientation: Orientation::Horizontal,
            start: Point2D::new(x0 as f64, y as f64),
            end: Point2D::new(x1 as f64, y as f64),
            length: x1 - x0 + 1,
        }
    }

    /// Build a vertical run on column `x` covering rows `y0..=y1`
    pub fn vertical(x: u32, y0: u32, y1: u32) -> Self {
        Self {
            orientation: Orientation::Vertical,
            start: Point2D::new(x as f64, y0 as f64),
            end: Point2D::new(x as f64, y1 as f64),
            length: y1 - y0 + 1,
        }
    }

    /// The coordinate shared by both endpoints (y for horizontal, x for vertical)
    pub fn fixed_coordinate(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.start.y,
            Orientation::Vertical => self.start.x,
        }
    }
}

/// Wall produced by merging collinear line segments
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WallSegment {
    pub start: Point2D,
    pub end: Point2D,
    pub orientation: Orientation,
    /// Cross-section thickness in meters
    pub thickness: f64,
    pub load_bearing: bool,
}

impl WallSegment {
    /// Start a wall from a single segment, unclassified until [`classify`](Self::classify)
    pub fn from_line(line: &LineSegment, thickness: f64) -> Self {
        Self {
            start: line.start,
            end: line.end,
            orientation: line.orientation,
            thickness,
            load_bearing: false,
        }
    }

    /// Euclidean length of the centerline in pixels
    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// Perpendicular coordinate (y for horizontal walls, x for vertical)
    pub fn perpendicular(&self) -> f64 {
        match self.orientation {
            Orientation::Horizontal => self.start.y,
            Orientation::Vertical => self.start.x,
        }
    }

    /// Along-axis extent as `(min, max)`
    pub fn span(&self) -> (f64, f64) {
        let (a, b) = match self.orientation {
            Orientation::Horizontal => (self.start.x, self.end.x),
            Orientation::Vertical => (self.start.y, self.end.y),
        };
        (a.min(b), a.max(b))
    }

    /// Apply the length-based structural classification
    pub fn classify(&mut self, load_bearing_min_length: f64, bearing: f64, partition: f64) {
        self.load_bearing = self.length() > load_bearing_min_length;
        self.thickness = if self.load_bearing {
            bearing
        } else {
            partition
        };
    }
}

/// Rectangular room synthesized from two horizontal wall levels
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomPolygon {
    pub name: String,
    /// Closed ring in pixel coordinates: top-left, top-right, bottom-right, bottom-left
    pub vertices: Vec<Point2D>,
}

impl RoomPolygon {
    pub fn rectangle(name: String, left: f64, right: f64, top: f64, bottom: f64) -> Self {
        Self {
            name,
            vertices: vec![
                Point2D::new(left, top),
                Point2D::new(right, top),
                Point2D::new(right, bottom),
                Point2D::new(left, bottom),
            ],
        }
    }

    /// Calculate polygon area using shoelace formula
    pub fn calculate_area(points: &[Point2D]) -> f64 {
        let n = points.len();
        if n < 3 {
            return 0.0;
        }

        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += points[i].x * points[j].y;
            area -= points[j].x * points[i].y;
        }

        (area / 2.0).abs()
    }

    /// Area in square pixels
    pub fn area(&self) -> f64 {
        Self::calculate_area(&self.vertices)
    }

    /// Area in square meters at the given scale
    pub fn area_m2(&self, scale: ScaleFactor) -> f64 {
        let scaled: Vec<Point2D> = self.vertices.iter().map(|v| v.scaled(scale)).collect();
        Self::calculate_area(&scaled)
    }
}

/// Meters per pixel, always inside `[ScaleFactor::MIN, ScaleFactor::MAX]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, PartialOrd)]
#[serde(from = "f64", into = "f64")]
pub struct ScaleFactor(f64);

impl ScaleFactor {
    pub const MIN: f64 = 0.005;
    pub const MAX: f64 = 0.05;
    /// Used when there is nothing to derive a scale from (1 pixel = 1 cm)
    pub const DEFAULT: ScaleFactor = ScaleFactor(0.01);

    /// Clamp a raw meters-per-pixel ratio into the accepted range
    pub fn clamped(value: f64) -> Self {
        if value.is_nan() {
            return Self::DEFAULT;
        }
        Self(value.clamp(Self::MIN, Self::MAX))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn to_meters(&self, pixels: f64) -> f64 {
        pixels * self.0
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Deserialized ratios go through the same clamp as computed ones
impl From<f64> for ScaleFactor {
    fn from(value: f64) -> Self {
        Self::clamped(value)
    }
}

impl From<ScaleFactor> for f64 {
    fn from(scale: ScaleFactor) -> Self {
        scale.0
    }
}

/// Counts reported alongside a successful recognition
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlanStats {
    pub rooms_found: usize,
    pub walls_found: usize,
    pub lines_found: usize,
}
