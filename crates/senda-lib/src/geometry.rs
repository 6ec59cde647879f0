//! Trail geometry helpers
//!
//! Endpoint extraction and bounds/center computation over the line geometries
//! the vector source provides. Degenerate geometries are a valid input: they
//! yield `None` rather than errors, and a selection proceeds without
//! endpoints or a camera target.

use geo::{Coord, Rect};

/// Geographic line geometry of a trail, in lon/lat pairs
#[derive(Clone, Debug, PartialEq)]
pub enum TrailGeometry {
    LineString(Vec<[f64; 2]>),
    MultiLineString(Vec<Vec<[f64; 2]>>),
}

/// Axis-aligned bounds and midpoint center of a geometry
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeometryFocus {
    pub bounds: Rect<f64>,
    pub center: [f64; 2],
}

impl TrailGeometry {
    /// Start and end coordinates of the trail.
    ///
    /// For a `LineString` these are the first and last coordinate, only when
    /// at least two exist. For a `MultiLineString` the start is the first
    /// coordinate of the first sub-line and the end the last coordinate of
    /// the last sub-line, each only if that sub-line is non-empty.
    pub fn endpoints(&self) -> (Option<[f64; 2]>, Option<[f64; 2]>) {
        match self {
            Self::LineString(coords) => {
                if coords.len() >= 2 {
                    (coords.first().copied(), coords.last().copied())
                } else {
                    (None, None)
                }
            }
            Self::MultiLineString(lines) => {
                let start = lines.first().and_then(|line| line.first()).copied();
                let end = lines.last().and_then(|line| line.last()).copied();
                (start, end)
            }
        }
    }

    /// Compute bounds and center over every coordinate of the geometry.
    ///
    /// Returns `None` when the geometry holds no coordinate at all.
    pub fn bounds_and_center(&self) -> Option<GeometryFocus> {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        let mut found = false;

        let mut visit = |coord: &[f64; 2]| {
            min_x = min_x.min(coord[0]);
            min_y = min_y.min(coord[1]);
            max_x = max_x.max(coord[0]);
            max_y = max_y.max(coord[1]);
            found = true;
        };

        match self {
            Self::LineString(coords) => coords.iter().for_each(&mut visit),
            Self::MultiLineString(lines) => {
                lines.iter().flatten().for_each(&mut visit);
            }
        }

        if !found {
            return None;
        }

        Some(GeometryFocus {
            bounds: Rect::new(
                Coord { x: min_x, y: min_y },
                Coord { x: max_x, y: max_y },
            ),
            center: [(min_x + max_x) / 2.0, (min_y + max_y) / 2.0],
        })
    }

    /// Iterate the geometry's sub-lines uniformly
    pub fn lines(&self) -> impl Iterator<Item = &[[f64; 2]]> {
        match self {
            Self::LineString(coords) => std::slice::from_ref(coords),
            Self::MultiLineString(lines) => lines.as_slice(),
        }
        .iter()
        .map(|line| line.as_slice())
    }
}
