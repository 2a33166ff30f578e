// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall aggregation for floor plan recognition
//!
//! Nearby parallel segments are folded into walls with a greedy pass: each
//! unconsumed segment becomes an anchor and absorbs every later segment of
//! the same orientation whose perpendicular offset from the anchor is below
//! the merge distance. Offsets are always measured against the anchor, not
//! the growing wall, and a consumed segment is never revisited, so the
//! result depends on input order. [`MergeStrategy::FixedPoint`] repeats the
//! pass until it stops merging.

use crate::config::{MergeStrategy, RecognitionConfig};
use crate::types::{LineSegment, Orientation, WallSegment};

/// Merge line segments into classified walls
pub fn aggregate_walls(
    lines: &[LineSegment],
    merge_distance: f64,
    config: &RecognitionConfig,
) -> Vec<WallSegment> {
    let seeds: Vec<WallSegment> = lines
        .iter()
        .map(|line| WallSegment::from_line(line, config.partition_thickness))
        .collect();

    let mut walls = merge_pass(&seeds, merge_distance);

    if config.merge_strategy == MergeStrategy::FixedPoint {
        let mut passes = 1;
        loop {
            let next = merge_pass(&walls, merge_distance);
            let converged = next.len() == walls.len();
            walls = next;
            passes += 1;
            if converged {
                break;
            }
        }
        tracing::debug!(passes, "Wall merge reached a fixed point");
    }

    for wall in &mut walls {
        wall.classify(
            config.load_bearing_min_length,
            config.load_bearing_thickness,
            config.partition_thickness,
        );
    }

    tracing::debug!(
        lines = lines.len(),
        walls = walls.len(),
        load_bearing = walls.iter().filter(|w| w.load_bearing).count(),
        merge_distance,
        "Aggregated walls"
    );

    walls
}

/// One greedy left-to-right merge over the given walls
fn merge_pass(seeds: &[WallSegment], merge_distance: f64) -> Vec<WallSegment> {
    let mut consumed = vec![false; seeds.len()];
    let mut walls = Vec::new();

    for (i, anchor) in seeds.iter().enumerate() {
        if consumed[i] {
            continue;
        }
        consumed[i] = true;

        let mut wall = anchor.clone();
        let anchor_offset = anchor.perpendicular();

        for (j, other) in seeds.iter().enumerate().skip(i + 1) {
            if consumed[j] || other.orientation != anchor.orientation {
                continue;
            }

            if (anchor_offset - other.perpendicular()).abs() < merge_distance {
                fold_into(&mut wall, other);
                consumed[j] = true;
            }
        }

        walls.push(wall);
    }

    walls
}

/// Union the along-axis extents and average the perpendicular coordinate
fn fold_into(wall: &mut WallSegment, other: &WallSegment) {
    let (wall_min, wall_max) = wall.span();
    let (other_min, other_max) = other.span();
    let min = wall_min.min(other_min);
    let max = wall_max.max(other_max);
    let offset = (wall.perpendicular() + other.perpendicular()) / 2.0;

    match wall.orientation {
        Orientation::Horizontal => {
            wall.start.x = min;
            wall.end.x = max;
            wall.start.y = offset;
            wall.end.y = offset;
        }
        Orientation::Vertical => {
            wall.start.y = min;
            wall.end.y = max;
            wall.start.x = offset;
            wall.end.x = offset;
        }
    }
}
