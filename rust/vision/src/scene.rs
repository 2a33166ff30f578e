// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Scene-builder input
//!
//! The 3D consumer takes an indexed wall graph rather than wall records: a
//! vertex list, edges as index pairs into it, one height and one thickness
//! per edge, and openings placed on edges. Everything here is in meters.

use crate::error::{RecognitionError, Result};
use crate::format::{parse_walls, ParsedWall};
use crate::types::{Point2D, ScaleFactor, WallSegment};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Wall height used when the plan does not state a ceiling height
pub const DEFAULT_STOREY_HEIGHT: f64 = 2.5;

/// Door or window cut into a wall
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OpeningKind {
    Door,
    Window,
}

impl OpeningKind {
    pub fn default_height(&self) -> f64 {
        match self {
            OpeningKind::Door => 2.0,
            OpeningKind::Window => 1.0,
        }
    }
}

/// Opening spanning `from..to` along edge `edge`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpeningRecord {
    pub edge: usize,
    pub kind: OpeningKind,
    pub height: f64,
    pub from: Point2D,
    pub to: Point2D,
}

/// Vertex identity: coordinates in centimeters, matching two-decimal output
type VertexKey = (i64, i64);

fn vertex_key(p: &Point2D) -> VertexKey {
    ((p.x * 100.0).round() as i64, (p.y * 100.0).round() as i64)
}

fn round_cm(p: Point2D) -> Point2D {
    Point2D::new((p.x * 100.0).round() / 100.0, (p.y * 100.0).round() / 100.0)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SceneInput {
    pub vertices: Vec<Point2D>,
    pub edges: Vec<[usize; 2]>,
    pub heights: Vec<f64>,
    pub thicknesses: Vec<f64>,
    pub openings: Vec<OpeningRecord>,
    #[serde(skip)]
    index: FxHashMap<VertexKey, usize>,
}

impl SceneInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Convert recognized walls (pixel space) at the given scale
    pub fn from_walls(walls: &[WallSegment], scale: ScaleFactor, storey_height: f64) -> Self {
        let mut scene = Self::new();
        for wall in walls {
            scene.push_edge(
                wall.start.scaled(scale),
                wall.end.scaled(scale),
                storey_height,
                wall.thickness,
            );
        }
        tracing::debug!(
            vertices = scene.vertices.len(),
            edges = scene.edges.len(),
            "Built scene input from walls"
        );
        scene
    }

    /// Convert wall records already parsed from text (meters)
    pub fn from_parsed_walls(walls: &[ParsedWall], storey_height: f64) -> Self {
        let mut scene = Self::new();
        for wall in walls {
            scene.push_edge(wall.start, wall.end, storey_height, wall.thickness);
        }
        scene
    }

    /// Parse a multi-line wall listing; `None` if any record is malformed
    pub fn from_wall_text(text: &str, storey_height: f64) -> Option<Self> {
        parse_walls(text).map(|walls| Self::from_parsed_walls(&walls, storey_height))
    }

    fn vertex(&mut self, p: Point2D) -> usize {
        let key = vertex_key(&p);
        if let Some(&i) = self.index.get(&key) {
            return i;
        }
        let i = self.vertices.len();
        self.vertices.push(round_cm(p));
        self.index.insert(key, i);
        i
    }

    /// Add a wall edge between two metric points, reusing coincident vertices
    pub fn push_edge(
        &mut self,
        start: Point2D,
        end: Point2D,
        height: f64,
        thickness: f64,
    ) -> usize {
        let a = self.vertex(start);
        let b = self.vertex(end);
        self.edges.push([a, b]);
        self.heights.push(height);
        self.thicknesses.push(thickness);
        self.edges.len() - 1
    }

    pub fn edge_length(&self, edge: usize) -> Option<f64> {
        let [a, b] = *self.edges.get(edge)?;
        Some(self.vertices[a].distance_to(&self.vertices[b]))
    }

    /// Place an opening between fractions `from` and `to` of an edge
    ///
    /// Fractions run from the edge's first vertex (0.0) to its second (1.0).
    /// `height` defaults to the kind's standard height and may not exceed the
    /// wall height.
    pub fn add_opening(
        &mut self,
        edge: usize,
        kind: OpeningKind,
        height: Option<f64>,
        from: f64,
        to: f64,
    ) -> Result<&OpeningRecord> {
        let Some(&[a, b]) = self.edges.get(edge) else {
            let message = format!("edge {} out of range ({} edges)", edge, self.edges.len());
            return Err(RecognitionError::InvalidOpening(message));
        };

        if !(0.0..=1.0).contains(&from) || !(0.0..=1.0).contains(&to) || from >= to {
            let message = format!("need 0 <= from < to <= 1, got {from}..{to}");
            return Err(RecognitionError::InvalidOpening(message));
        }

        let height = height.unwrap_or_else(|| kind.default_height());
        let wall_height = self.heights[edge];
        if height <= 0.0 || height > wall_height {
            let message = format!("height {height} outside wall height {wall_height}");
            return Err(RecognitionError::InvalidOpening(message));
        }

        let p = self.vertices[a].to_nalgebra();
        let q = self.vertices[b].to_nalgebra();
        let along = q - p;

        self.openings.push(OpeningRecord {
            edge,
            kind,
            height,
            from: Point2D::from_nalgebra(&(p + along * from)),
            to: Point2D::from_nalgebra(&(p + along * to)),
        });
        let last = self.openings.len() - 1;
        Ok(&self.openings[last])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::format_walls;
    use crate::types::LineSegment;
    use approx::assert_relative_eq;

    fn rectangle_walls() -> Vec<WallSegment> {
        vec![
            WallSegment::from_line(&LineSegment::horizontal(0, 0, 600), 0.4),
            WallSegment::from_line(&LineSegment::horizontal(400, 0, 600), 0.4),
            WallSegment::from_line(&LineSegment::vertical(0, 0, 400), 0.12),
            WallSegment::from_line(&LineSegment::vertical(600, 0, 400), 0.12),
        ]
    }

    #[test]
    fn test_corners_are_shared() {
        let scene = SceneInput::from_walls(
            &rectangle_walls(),
            ScaleFactor::clamped(0.01),
            DEFAULT_STOREY_HEIGHT,
        );

        assert_eq!(scene.vertices.len(), 4);
        assert_eq!(scene.edges.len(), 4);
        assert_eq!(scene.edges[0], [0, 1]);
        assert_eq!(scene.vertices[1], Point2D::new(6.0, 0.0));
        assert_eq!(scene.heights, vec![2.5; 4]);
        assert_eq!(scene.thicknesses, vec![0.4, 0.4, 0.12, 0.12]);
        assert_relative_eq!(scene.edge_length(2).unwrap(), 4.0);
    }

    #[test]
    fn test_from_wall_text_matches_from_walls() {
        let scale = ScaleFactor::clamped(0.01);
        let text = format_walls(&rectangle_walls(), scale);

        let parsed = SceneInput::from_wall_text(&text, 3.0).unwrap();
        let direct = SceneInput::from_walls(&rectangle_walls(), scale, 3.0);

        assert_eq!(parsed.vertices, direct.vertices);
        assert_eq!(parsed.edges, direct.edges);
        assert!(SceneInput::from_wall_text("garbage", 3.0).is_none());
    }

    #[test]
    fn test_door_placement() {
        let scale = ScaleFactor::clamped(0.01);
        let mut scene = SceneInput::from_walls(&rectangle_walls(), scale, 2.5);

        let door = scene
            .add_opening(0, OpeningKind::Door, None, 0.25, 0.5)
            .unwrap()
            .clone();

        assert_eq!(door.height, 2.0);
        assert_relative_eq!(door.from.x, 1.5);
        assert_relative_eq!(door.to.x, 3.0);
        assert_relative_eq!(door.from.y, 0.0);
        assert_eq!(scene.openings.len(), 1);
    }

    #[test]
    fn test_invalid_openings_rejected() {
        let scale = ScaleFactor::clamped(0.01);
        let mut scene = SceneInput::from_walls(&rectangle_walls(), scale, 2.5);

        let cases = [
            (9, None, 0.1, 0.2),
            (0, None, 0.6, 0.4),
            (0, None, -0.1, 0.4),
            (0, Some(3.0), 0.1, 0.2),
        ];
        for (edge, height, from, to) in cases {
            let err = scene
                .add_opening(edge, OpeningKind::Window, height, from, to)
                .unwrap_err();
            assert!(matches!(err, RecognitionError::InvalidOpening(_)));
        }
        assert!(scene.openings.is_empty());
    }

    #[test]
    fn test_serialized_shape() {
        let scale = ScaleFactor::clamped(0.01);
        let mut scene = SceneInput::from_walls(&rectangle_walls()[..1], scale, 2.5);
        scene
            .add_opening(0, OpeningKind::Window, None, 0.1, 0.3)
            .unwrap();

        let value = serde_json::to_value(&scene).unwrap();
        assert_eq!(value["edges"], serde_json::json!([[0, 1]]));
        assert_eq!(value["openings"][0]["kind"], "window");
        assert_eq!(value["openings"][0]["height"], 1.0);
        assert!(value.get("index").is_none());
    }
}
