// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Textual wall and room records
//!
//! Walls: `x1,y1 -> x2,y2; <load-bearing|partition>; thickness`
//! Rooms: `name:x1,y1;x2,y2;x3,y3;x4,y4`
//!
//! Coordinates are in meters with two decimals. One record per line.

use crate::types::{Point2D, RoomPolygon, ScaleFactor, WallSegment};

pub const LOAD_BEARING_LABEL: &str = "load-bearing";
pub const PARTITION_LABEL: &str = "partition";

fn format_point(p: &Point2D, scale: ScaleFactor) -> String {
    let scaled = p.scaled(scale);
    format!("{:.2},{:.2}", scaled.x, scaled.y)
}

pub fn format_wall(wall: &WallSegment, scale: ScaleFactor) -> String {
    let kind = if wall.load_bearing {
        LOAD_BEARING_LABEL
    } else {
        PARTITION_LABEL
    };
    format!(
        "{} -> {}; {}; {:.2}",
        format_point(&wall.start, scale),
        format_point(&wall.end, scale),
        kind,
        wall.thickness
    )
}

pub fn format_walls(walls: &[WallSegment], scale: ScaleFactor) -> String {
    walls
        .iter()
        .map(|w| format_wall(w, scale))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_room(room: &RoomPolygon, scale: ScaleFactor) -> String {
    let coords = room
        .vertices
        .iter()
        .map(|v| format_point(v, scale))
        .collect::<Vec<_>>()
        .join(";");
    format!("{}:{}", room.name, coords)
}

pub fn format_rooms(rooms: &[RoomPolygon], scale: ScaleFactor) -> String {
    rooms
        .iter()
        .map(|r| format_room(r, scale))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sum of room areas in square meters (shoelace over scaled vertices)
pub fn total_area_m2(rooms: &[RoomPolygon], scale: ScaleFactor) -> f64 {
    rooms.iter().map(|r| r.area_m2(scale)).sum()
}

/// Total area as reported in the recognition result
pub fn format_area(area_m2: f64) -> String {
    format!("{:.1}", area_m2)
}

/// A wall record read back from its textual form
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedWall {
    /// Start point in meters
    pub start: Point2D,
    /// End point in meters
    pub end: Point2D,
    pub load_bearing: bool,
    /// Thickness in meters
    pub thickness: f64,
}

/// A room record read back from its textual form
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedRoom {
    pub name: String,
    /// Vertices in meters
    pub vertices: Vec<Point2D>,
}

fn parse_point(text: &str) -> Option<Point2D> {
    let (x, y) = text.trim().split_once(',')?;
    Some(Point2D::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

/// Parse one `x1,y1 -> x2,y2; kind; thickness` line
pub fn parse_wall_line(line: &str) -> Option<ParsedWall> {
    let mut parts = line.split(';');
    let (start, end) = parts.next()?.split_once("->")?;
    let load_bearing = match parts.next()?.trim() {
        LOAD_BEARING_LABEL => true,
        PARTITION_LABEL => false,
        _ => return None,
    };
    let thickness = parts.next()?.trim().parse().ok()?;
    if parts.next().is_some() {
        return None;
    }

    Some(ParsedWall {
        start: parse_point(start)?,
        end: parse_point(end)?,
        load_bearing,
        thickness,
    })
}

/// Parse one `name:x1,y1;...` line
pub fn parse_room_line(line: &str) -> Option<ParsedRoom> {
    let (name, coords) = line.rsplit_once(':')?;
    let vertices = coords
        .split(';')
        .map(parse_point)
        .collect::<Option<Vec<_>>>()?;
    if vertices.len() < 3 {
        return None;
    }

    Some(ParsedRoom {
        name: name.trim().to_string(),
        vertices,
    })
}

/// Parse a multi-line wall listing, skipping blank lines
pub fn parse_walls(text: &str) -> Option<Vec<ParsedWall>> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(parse_wall_line)
        .collect()
}

/// Parse a multi-line room listing, skipping blank lines
pub fn parse_rooms(text: &str) -> Option<Vec<ParsedRoom>> {
    text.lines()
        .filter(|l| !l.trim().is_empty())
        .map(parse_room_line)
        .collect()
}
