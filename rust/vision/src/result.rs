// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Recognition outcome as handed to callers
//!
//! [`RecognizedPlan`] keeps the geometry in pixels together with the scale;
//! [`RecognitionResult`] is the serialized form that leaves the crate:
//!
//! ```json
//! { "success": true, "rooms": "...", "walls": "...", "area": "54.3",
//!   "ceilingHeight": null, "address": null,
//!   "stats": { "roomsFound": 1, "wallsFound": 4, "linesFound": 8 } }
//! ```
//!
//! or `{ "success": false, "error": "..." }`.

use crate::error::Result;
use crate::format::{format_area, format_rooms, format_walls, total_area_m2};
use crate::metadata::PlanMetadata;
use crate::types::{PlanStats, RoomPolygon, ScaleFactor, WallSegment};
use serde::{Deserialize, Serialize};

/// Geometry produced by one recognition run, still in pixel space
#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedPlan {
    pub lines_found: usize,
    pub walls: Vec<WallSegment>,
    pub rooms: Vec<RoomPolygon>,
    pub scale: ScaleFactor,
    pub metadata: PlanMetadata,
    /// Dimensions of the processed (possibly downscaled) buffer
    pub image_width: u32,
    pub image_height: u32,
}

impl RecognizedPlan {
    pub fn stats(&self) -> PlanStats {
        PlanStats {
            rooms_found: self.rooms.len(),
            walls_found: self.walls.len(),
            lines_found: self.lines_found,
        }
    }

    /// Summed room area in square meters
    pub fn rooms_area_m2(&self) -> f64 {
        total_area_m2(&self.rooms, self.scale)
    }

    /// Known area from metadata, else the summed room area; `None` without rooms
    pub fn reported_area(&self) -> Option<String> {
        match self.metadata.area {
            Some(area) => Some(area.to_string()),
            None if !self.rooms.is_empty() => Some(format_area(self.rooms_area_m2())),
            None => None,
        }
    }

    pub fn to_result(&self) -> RecognitionResult {
        RecognitionResult::Success(RecognitionSuccess {
            success: true,
            rooms: format_rooms(&self.rooms, self.scale),
            walls: format_walls(&self.walls, self.scale),
            area: self.reported_area(),
            ceiling_height: self.metadata.ceiling_height.map(|h| h.to_string()),
            address: self.metadata.address.clone(),
            stats: self.stats(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecognitionSuccess {
    pub success: bool,
    /// One `name:x,y;...` record per line
    pub rooms: String,
    /// One `x1,y1 -> x2,y2; kind; thickness` record per line
    pub walls: String,
    pub area: Option<String>,
    pub ceiling_height: Option<String>,
    pub address: Option<String>,
    pub stats: PlanStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionFailure {
    pub success: bool,
    pub error: String,
}

/// The only artifact that crosses the recognition boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecognitionResult {
    Success(RecognitionSuccess),
    Failure(RecognitionFailure),
}

impl RecognitionResult {
    pub fn failure(error: impl Into<String>) -> Self {
        RecognitionResult::Failure(RecognitionFailure {
            success: false,
            error: error.into(),
        })
    }

    /// Convert a pipeline outcome, turning any error into a failure result
    pub fn from_outcome(outcome: Result<RecognizedPlan>) -> Self {
        match outcome {
            Ok(plan) => plan.to_result(),
            Err(e) => {
                tracing::warn!(error = %e, "Plan recognition failed");
                Self::failure(e.to_string())
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RecognitionResult::Success(_))
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            RecognitionResult::Failure(f) => Some(&f.error),
            RecognitionResult::Success(_) => None,
        }
    }

    pub fn stats(&self) -> Option<PlanStats> {
        match self {
            RecognitionResult::Success(s) => Some(s.stats),
            RecognitionResult::Failure(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecognitionError;
    use crate::types::LineSegment;
    use serde_json::json;

    fn sample_plan() -> RecognizedPlan {
        let walls = vec![
            WallSegment::from_line(&LineSegment::horizontal(0, 0, 100), 0.12),
            WallSegment::from_line(&LineSegment::horizontal(100, 0, 100), 0.12),
        ];
        let room = RoomPolygon::rectangle("Room 1".into(), 0.0, 100.0, 0.0, 100.0);
        RecognizedPlan {
            lines_found: 3,
            walls,
            rooms: vec![room],
            scale: ScaleFactor::clamped(0.02),
            metadata: PlanMetadata::default(),
            image_width: 101,
            image_height: 101,
        }
    }

    #[test]
    fn test_success_shape() {
        let value = serde_json::to_value(sample_plan().to_result()).unwrap();

        assert_eq!(value["success"], json!(true));
        assert_eq!(value["area"], json!("4.0"));
        assert_eq!(value["ceilingHeight"], json!(null));
        assert_eq!(value["address"], json!(null));
        assert_eq!(
            value["stats"],
            json!({ "roomsFound": 1, "wallsFound": 2, "linesFound": 3 })
        );
        assert_eq!(
            value["rooms"],
            json!("Room 1:0.00,0.00;2.00,0.00;2.00,2.00;0.00,2.00")
        );
        assert_eq!(value["walls"].as_str().unwrap().lines().count(), 2);
    }

    #[test]
    fn test_known_metadata_is_echoed() {
        let mut plan = sample_plan();
        plan.metadata = PlanMetadata {
            area: Some(48.0),
            ceiling_height: Some(2.7),
            address: Some("г. Казань, ул. Баумана 12".into()),
        };

        let value = serde_json::to_value(plan.to_result()).unwrap();
        assert_eq!(value["area"], json!("48"));
        assert_eq!(value["ceilingHeight"], json!("2.7"));
        assert_eq!(value["address"], json!("г. Казань, ул. Баумана 12"));
    }

    #[test]
    fn test_no_rooms_means_no_area() {
        let mut plan = sample_plan();
        plan.rooms.clear();
        assert_eq!(plan.reported_area(), None);
    }

    #[test]
    fn test_failure_shape() {
        let result = RecognitionResult::from_outcome(Err(RecognitionError::NoLinesDetected));

        assert!(!result.is_success());
        assert!(result.stats().is_none());
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["success"], json!(false));
        let error = value["error"].as_str().unwrap();
        assert!(error.starts_with("No lines detected"));
        assert_eq!(value.as_object().unwrap().len(), 2);
    }

    #[test]
    fn test_deserialize_both_variants() {
        let value = serde_json::to_value(sample_plan().to_result()).unwrap();
        let ok: RecognitionResult = serde_json::from_value(value).unwrap();
        assert!(ok.is_success());

        let failed: RecognitionResult =
            serde_json::from_str(r#"{"success": false, "error": "boom"}"#).unwrap();
        assert_eq!(failed.error(), Some("boom"));
    }
}
