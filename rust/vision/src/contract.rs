// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Planning-project persistence payloads
//!
//! Request and response shapes of the `createPlanningProject` mutation. Only
//! the data is produced here; sending it is up to the caller.

use crate::result::RecognizedPlan;
use crate::scene::DEFAULT_STOREY_HEIGHT;
use crate::types::Point2D;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecognitionStatus {
    Recognized,
    Failed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanInfo {
    pub address: Option<String>,
    /// Square meters
    pub area: Option<f64>,
    pub ceiling_height: Option<f64>,
    /// File name or origin of the plan
    pub source: String,
    pub recognition_status: RecognitionStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomInput {
    pub id: String,
    pub name: String,
    pub height: f64,
    pub vertices: Vec<Point2D>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlanGeometry {
    pub rooms: Vec<RoomInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WallInput {
    pub id: String,
    pub start: Point2D,
    pub end: Point2D,
    pub load_bearing: bool,
    pub thickness: f64,
}

/// `PlanningProjectInput` of the mutation, coordinates in meters
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanningProjectInput {
    pub plan: PlanInfo,
    pub geometry: PlanGeometry,
    pub walls: Vec<WallInput>,
}

impl PlanningProjectInput {
    /// Build the payload for a successful recognition
    ///
    /// Room height is the ceiling height from metadata when known.
    pub fn from_plan(plan: &RecognizedPlan, source: impl Into<String>) -> Self {
        let scale = plan.scale;
        let metadata = &plan.metadata;
        let height = metadata.ceiling_height.unwrap_or(DEFAULT_STOREY_HEIGHT);
        let area = metadata
            .area
            .or_else(|| (!plan.rooms.is_empty()).then(|| plan.rooms_area_m2()));

        let rooms = plan
            .rooms
            .iter()
            .enumerate()
            .map(|(i, room)| RoomInput {
                id: format!("room-{}", i + 1),
                name: room.name.clone(),
                height,
                vertices: room.vertices.iter().map(|v| v.scaled(scale)).collect(),
            })
            .collect();

        let walls = plan
            .walls
            .iter()
            .enumerate()
            .map(|(i, wall)| WallInput {
                id: format!("wall-{}", i + 1),
                start: wall.start.scaled(scale),
                end: wall.end.scaled(scale),
                load_bearing: wall.load_bearing,
                thickness: wall.thickness,
            })
            .collect();

        Self {
            plan: PlanInfo {
                address: metadata.address.clone(),
                area,
                ceiling_height: metadata.ceiling_height,
                source: source.into(),
                recognition_status: RecognitionStatus::Recognized,
            },
            geometry: PlanGeometry { rooms },
            walls,
        }
    }

    /// Payload recording a plan that could not be recognized
    pub fn failed(source: impl Into<String>) -> Self {
        Self {
            plan: PlanInfo {
                address: None,
                area: None,
                ceiling_height: None,
                source: source.into(),
                recognition_status: RecognitionStatus::Failed,
            },
            geometry: PlanGeometry::default(),
            walls: Vec::new(),
        }
    }

    /// Mutation variables: `{ "input": ... }`
    pub fn to_variables(&self) -> serde_json::Value {
        serde_json::json!({ "input": self })
    }
}

/// Fields echoed back by the mutation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanningProjectResponse {
    pub id: String,
    pub status: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::PlanMetadata;
    use crate::types::{LineSegment, RoomPolygon, ScaleFactor, WallSegment};
    use approx::assert_relative_eq;

    fn plan() -> RecognizedPlan {
        let mut wall = WallSegment::from_line(&LineSegment::horizontal(0, 0, 300), 0.12);
        wall.classify(200.0, 0.4, 0.12);
        let room = RoomPolygon::rectangle("Room 1".into(), 0.0, 300.0, 0.0, 200.0);
        RecognizedPlan {
            lines_found: 2,
            walls: vec![wall],
            rooms: vec![room],
            scale: ScaleFactor::clamped(0.01),
            metadata: PlanMetadata {
                ceiling_height: Some(2.7),
                ..Default::default()
            },
            image_width: 301,
            image_height: 201,
        }
    }

    #[test]
    fn test_input_from_plan() {
        let input = PlanningProjectInput::from_plan(&plan(), "plan.png");

        assert_eq!(input.plan.recognition_status, RecognitionStatus::Recognized);
        assert_relative_eq!(input.plan.area.unwrap(), 6.0, epsilon = 1e-9);
        assert_eq!(input.geometry.rooms[0].id, "room-1");
        assert_eq!(input.geometry.rooms[0].height, 2.7);
        assert_relative_eq!(input.geometry.rooms[0].vertices[2].x, 3.0, epsilon = 1e-9);
        assert_eq!(input.walls[0].id, "wall-1");
        assert!(input.walls[0].load_bearing);
        assert_eq!(input.walls[0].thickness, 0.4);
    }

    #[test]
    fn test_camel_case_variables() {
        let vars = PlanningProjectInput::from_plan(&plan(), "plan.png").to_variables();

        assert_eq!(vars["input"]["plan"]["ceilingHeight"], 2.7);
        assert_eq!(vars["input"]["plan"]["recognitionStatus"], "recognized");
        assert_eq!(vars["input"]["walls"][0]["loadBearing"], true);
        assert!(vars["input"]["geometry"]["rooms"].is_array());
    }

    #[test]
    fn test_failed_payload() {
        let input = PlanningProjectInput::failed("scan.pdf");
        assert_eq!(input.plan.recognition_status, RecognitionStatus::Failed);
        assert!(input.walls.is_empty());
        assert!(input.geometry.rooms.is_empty());
    }

    #[test]
    fn test_response_parse() {
        let response: PlanningProjectResponse = serde_json::from_str(
            r#"{"id": "p-42", "status": "draft", "createdAt": "2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(response.id, "p-42");
        assert_eq!(response.created_at, "2024-05-01T10:00:00Z");
    }
}
