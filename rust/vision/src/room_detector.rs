// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Room detection from horizontal wall levels
//!
//! Rooms are modelled as axis-aligned rectangles. Horizontal walls are
//! grouped into levels by y; for each pair of adjacent levels far enough
//! apart, every top/bottom wall pair whose x-extents overlap yields one room
//! spanning the overlap. Vertical enclosure is not checked, so partial
//! horizontal runs can produce extra rooms.

use crate::config::RecognitionConfig;
use crate::types::{Orientation, RoomPolygon, WallSegment};

/// Horizontal walls sharing a y-coordinate within the level tolerance
#[derive(Debug, Clone)]
pub struct Level<'a> {
    /// y of the first (topmost) wall in the level
    pub y: f64,
    pub walls: Vec<&'a WallSegment>,
}

/// Group horizontal walls into ascending levels
///
/// A wall joins the current level while its y is within `tolerance` of the
/// level's first y; otherwise it opens a new level.
pub fn group_levels(walls: &[WallSegment], tolerance: f64) -> Vec<Level<'_>> {
    let mut horizontal: Vec<&WallSegment> = walls
        .iter()
        .filter(|w| w.orientation == Orientation::Horizontal)
        .collect();
    horizontal.sort_by(|a, b| a.perpendicular().total_cmp(&b.perpendicular()));

    let mut levels: Vec<Level> = Vec::new();
    for wall in horizontal {
        let y = wall.perpendicular();
        match levels.last_mut() {
            Some(level) if (y - level.y).abs() < tolerance => {
                level.walls.push(wall);
                continue;
            }
            _ => {}
        }
        levels.push(Level {
            y,
            walls: vec![wall],
        });
    }

    levels
}

/// Detect rectangular rooms bounded by pairs of horizontal wall levels
///
/// Image dimensions are only reported in logs.
pub fn detect_rooms(
    walls: &[WallSegment],
    image_width: u32,
    image_height: u32,
    config: &RecognitionConfig,
) -> Vec<RoomPolygon> {
    let levels = group_levels(walls, config.level_tolerance);
    let mut rooms = Vec::new();

    for pair in levels.windows(2) {
        let (top, bottom) = (&pair[0], &pair[1]);
        if bottom.y - top.y <= config.min_room_height {
            continue;
        }

        for top_wall in &top.walls {
            let (top_left, top_right) = top_wall.span();
            for bottom_wall in &bottom.walls {
                let (bottom_left, bottom_right) = bottom_wall.span();
                let left = top_left.max(bottom_left);
                let right = top_right.min(bottom_right);

                if right > left {
                    let name = format!("Room {}", rooms.len() + 1);
                    rooms.push(RoomPolygon::rectangle(name, left, right, top.y, bottom.y));
                }
            }
        }
    }

    tracing::debug!(
        levels = levels.len(),
        rooms = rooms.len(),
        image_width,
        image_height,
        "Detected rooms"
    );

    rooms
}
