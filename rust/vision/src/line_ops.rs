// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Axis-aligned line extraction from an edge map
//!
//! Every row is scanned for horizontal runs and every column for vertical
//! runs of pixels brighter than the edge threshold. Runs at least
//! `min_length` long become [`LineSegment`]s.

use crate::edges::EdgeMap;
use crate::types::{LineSegment, Orientation};
use rustc_hash::FxHashSet;

/// Canonical identity of an emitted run: orientation, fixed coordinate,
/// first and last (inclusive) position along the axis
type SegmentKey = (Orientation, u32, u32, u32);

/// Collects runs, refusing any segment whose key was already emitted
struct RunCollector {
    min_length: u32,
    emitted: FxHashSet<SegmentKey>,
    lines: Vec<LineSegment>,
}

impl RunCollector {
    fn new(min_length: u32) -> Self {
        Self {
            min_length,
            emitted: FxHashSet::default(),
            lines: Vec::new(),
        }
    }

    /// Evaluate a closed run `first..=last` on the given fixed coordinate
    fn close_run(&mut self, orientation: Orientation, fixed: u32, first: u32, last: u32) {
        let length = last - first + 1;
        if length < self.min_length {
            return;
        }

        if !self.emitted.insert((orientation, fixed, first, last)) {
            return;
        }

        let segment = match orientation {
            Orientation::Horizontal => LineSegment::horizontal(fixed, first, last),
            Orientation::Vertical => LineSegment::vertical(fixed, first, last),
        };
        self.lines.push(segment);
    }

    /// Scan one row or column; `is_edge(i)` reports whether position `i` is lit
    fn scan<F>(&mut self, orientation: Orientation, fixed: u32, len: u32, is_edge: F)
    where
        F: Fn(u32) -> bool,
    {
        let mut run_start: Option<u32> = None;

        for i in 0..len {
            match (is_edge(i), run_start) {
                (true, None) => run_start = Some(i),
                (false, Some(start)) => {
                    self.close_run(orientation, fixed, start, i - 1);
                    run_start = None;
                }
                _ => {}
            }
        }

        // A run touching the far border is still open here
        if let Some(start) = run_start {
            self.close_run(orientation, fixed, start, len - 1);
        }
    }
}

/// Extract horizontal and vertical runs from an edge map
///
/// Horizontal segments come first (rows top to bottom, runs left to right),
/// then vertical ones (columns left to right). An empty result means the map
/// holds no usable line; callers must treat that as a failure.
pub fn extract_lines(edges: &EdgeMap, min_length: u32, edge_threshold: u8) -> Vec<LineSegment> {
    let (width, height) = edges.dimensions();
    let mut collector = RunCollector::new(min_length.max(1));

    for y in 0..height {
        collector.scan(Orientation::Horizontal, y, width, |x| {
            edges.get_pixel(x, y).0[0] > edge_threshold
        });
    }

    for x in 0..width {
        collector.scan(Orientation::Vertical, x, height, |y| {
            edges.get_pixel(x, y).0[0] > edge_threshold
        });
    }

    tracing::debug!(
        lines = collector.lines.len(),
        min_length,
        edge_threshold,
        "Extracted line segments"
    );

    collector.lines
}
