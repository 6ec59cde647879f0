//! Spatial feature query
//!
//! Resolves a pointer position to a ranked list of candidate trail features.
//! The render engine stays behind [`RenderedFeatureSource`]: it answers which
//! features are drawn inside a pixel rectangle, topmost first, and this module
//! adds the tolerance box expansion and the identifying-attribute filter.

use crate::feature::TrailFeature;

/// Hit-test tolerance for hover feedback, in pixels
pub const HOVER_TOLERANCE_PX: f32 = 8.0;

/// Hit-test tolerance for clicks, in pixels (more forgiving than hover)
pub const CLICK_TOLERANCE_PX: f32 = 10.0;

/// Axis-aligned rectangle in viewport (pixel) space
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelRect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl PixelRect {
    /// Square box of side `2 * tolerance` around a pointer position
    pub fn around(point: [f32; 2], tolerance: f32) -> Self {
        Self {
            min_x: point[0] - tolerance,
            min_y: point[1] - tolerance,
            max_x: point[0] + tolerance,
            max_y: point[1] + tolerance,
        }
    }

    pub fn contains(&self, point: [f32; 2]) -> bool {
        point[0] >= self.min_x
            && point[0] <= self.max_x
            && point[1] >= self.min_y
            && point[1] <= self.max_y
    }
}

/// Render-engine seam: which features are drawn inside a pixel rectangle.
///
/// Implementations must return features in top-to-bottom draw order (the
/// most recently drawn feature first) and may include non-trail layers;
/// filtering is done here.
pub trait RenderedFeatureSource {
    fn features_intersecting(&self, rect: PixelRect) -> Vec<TrailFeature>;
}

/// Resolve a pointer position to candidate trail features.
///
/// Expands the point into a square box of side `2 * tolerance_px`, queries
/// the source and keeps only identified features, preserving draw order.
/// The caller always uses index 0 as the resolved pick; ties are broken
/// implicitly by draw order. Returns an empty list, never an error, when
/// nothing qualifies.
pub fn query_features(
    source: &dyn RenderedFeatureSource,
    pointer_px: [f32; 2],
    tolerance_px: f32,
) -> Vec<TrailFeature> {
    let rect = PixelRect::around(pointer_px, tolerance_px);
    source
        .features_intersecting(rect)
        .into_iter()
        .filter(TrailFeature::is_identified)
        .collect()
}

/// Whether a screen-space polyline touches a pixel rectangle.
///
/// True when any vertex lies inside the rectangle or any segment crosses one
/// of its edges. Used by source implementations to answer
/// [`RenderedFeatureSource::features_intersecting`] from projected geometry.
pub fn polyline_hits_rect(points: &[[f32; 2]], rect: PixelRect) -> bool {
    if points.iter().any(|p| rect.contains(*p)) {
        return true;
    }
    points
        .windows(2)
        .any(|seg| segment_crosses_rect(seg[0], seg[1], rect))
}

fn segment_crosses_rect(a: [f32; 2], b: [f32; 2], rect: PixelRect) -> bool {
    let corners = [
        [rect.min_x, rect.min_y],
        [rect.max_x, rect.min_y],
        [rect.max_x, rect.max_y],
        [rect.min_x, rect.max_y],
    ];
    (0..4).any(|i| segments_intersect(a, b, corners[i], corners[(i + 1) % 4]))
}

fn segments_intersect(p1: [f32; 2], p2: [f32; 2], p3: [f32; 2], p4: [f32; 2]) -> bool {
    let d1 = cross(p3, p4, p1);
    let d2 = cross(p3, p4, p2);
    let d3 = cross(p1, p2, p3);
    let d4 = cross(p1, p2, p4);
    if ((d1 > 0.0 && d2 < 0.0) || (d1 < 0.0 && d2 > 0.0))
        && ((d3 > 0.0 && d4 < 0.0) || (d3 < 0.0 && d4 > 0.0))
    {
        return true;
    }
    (d1 == 0.0 && on_segment(p3, p4, p1))
        || (d2 == 0.0 && on_segment(p3, p4, p2))
        || (d3 == 0.0 && on_segment(p1, p2, p3))
        || (d4 == 0.0 && on_segment(p1, p2, p4))
}

fn cross(a: [f32; 2], b: [f32; 2], c: [f32; 2]) -> f32 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn on_segment(a: [f32; 2], b: [f32; 2], p: [f32; 2]) -> bool {
    p[0] >= a[0].min(b[0])
        && p[0] <= a[0].max(b[0])
        && p[1] >= a[1].min(b[1])
        && p[1] <= a[1].max(b[1])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TrailGeometry;

    fn feature(name: &str) -> TrailFeature {
        TrailFeature {
            id: None,
            display_name: name.to_string(),
            classification: None,
            length_km: None,
            download_links: Vec::new(),
            info_url: None,
            color: None,
            geometry: TrailGeometry::LineString(vec![]),
        }
    }

    /// Source returning a fixed list regardless of the rectangle
    struct FixedSource(Vec<TrailFeature>);

    impl RenderedFeatureSource for FixedSource {
        fn features_intersecting(&self, _rect: PixelRect) -> Vec<TrailFeature> {
            self.0.clone()
        }
    }

    /// Source recording the rectangle it was asked about
    struct RecordingSource(std::cell::Cell<Option<PixelRect>>);

    impl RenderedFeatureSource for RecordingSource {
        fn features_intersecting(&self, rect: PixelRect) -> Vec<TrailFeature> {
            self.0.set(Some(rect));
            Vec::new()
        }
    }

    #[test]
    fn test_query_expands_tolerance_box() {
        let source = RecordingSource(std::cell::Cell::new(None));
        let result = query_features(&source, [100.0, 50.0], CLICK_TOLERANCE_PX);
        assert!(result.is_empty());
        let rect = source.0.get().unwrap();
        assert_eq!(rect.min_x, 90.0);
        assert_eq!(rect.max_x, 110.0);
        assert_eq!(rect.min_y, 40.0);
        assert_eq!(rect.max_y, 60.0);
    }

    #[test]
    fn test_query_filters_unidentified_features_keeping_order() {
        let source = FixedSource(vec![feature("top"), feature(""), feature("bottom")]);
        let result = query_features(&source, [0.0, 0.0], HOVER_TOLERANCE_PX);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].display_name, "top");
        assert_eq!(result[1].display_name, "bottom");
    }

    #[test]
    fn test_query_empty_is_not_an_error() {
        let source = FixedSource(vec![feature("")]);
        assert!(query_features(&source, [0.0, 0.0], HOVER_TOLERANCE_PX).is_empty());
    }

    #[test]
    fn test_polyline_vertex_inside_rect() {
        let rect = PixelRect::around([0.0, 0.0], 5.0);
        assert!(polyline_hits_rect(&[[100.0, 100.0], [3.0, 3.0]], rect));
    }

    #[test]
    fn test_polyline_segment_crossing_rect_without_vertex_inside() {
        let rect = PixelRect::around([0.0, 0.0], 5.0);
        // Horizontal segment passing straight through the box
        assert!(polyline_hits_rect(&[[-100.0, 0.0], [100.0, 0.0]], rect));
    }

    #[test]
    fn test_polyline_missing_rect() {
        let rect = PixelRect::around([0.0, 0.0], 5.0);
        assert!(!polyline_hits_rect(&[[-100.0, 50.0], [100.0, 50.0]], rect));
        assert!(!polyline_hits_rect(&[], rect));
    }
}
