//! Walkers plugin for the trail layer
//!
//! Draws the trail network, the selection overlay (glow + main stroke) and
//! the start/end markers, and probes the pointer against the projected
//! geometry each frame. The probe result is published through a shared slot
//! so the app can drive the selection state machine outside the map closure.

use egui::{Color32, Stroke};
use senda_lib::{
    CLICK_TOLERANCE_PX, HOVER_TOLERANCE_PX, EndpointKind, OverlaySources, PixelRect,
    RenderedFeatureSource, TrailFeature, TrailGeometry, polyline_hits_rect, query_features,
};
use std::sync::Arc;
use walkers::{Plugin, Projector};

/// Fallback trail color when the tile carries none
const DEFAULT_TRAIL_COLOR: Color32 = Color32::from_rgb(70, 130, 220);

/// Selection highlight color (#0d6efd)
const SELECTION_COLOR: Color32 = Color32::from_rgb(13, 110, 253);

/// What the pointer was over during the last frame
#[derive(Default)]
pub struct PointerProbe {
    /// Candidates under the pointer at hover tolerance, topmost first
    pub hover: Vec<TrailFeature>,
    /// Pointer position in screen space, when over the map
    pub hover_pos: Option<[f32; 2]>,
    /// Candidates of a click this frame at click tolerance, topmost first
    pub click: Option<Vec<TrailFeature>>,
}

/// Plugin rendering the trail layer and the selection overlay
pub struct TrailLayerPlugin {
    trails: Arc<std::sync::RwLock<Vec<TrailFeature>>>,
    overlay: OverlaySources,
    line_width: f32,
    probe: Arc<std::sync::RwLock<PointerProbe>>,
}

impl TrailLayerPlugin {
    pub fn new(
        trails: Arc<std::sync::RwLock<Vec<TrailFeature>>>,
        overlay: OverlaySources,
        line_width: f32,
        probe: Arc<std::sync::RwLock<PointerProbe>>,
    ) -> Self {
        Self {
            trails,
            overlay,
            line_width,
            probe,
        }
    }
}

/// Project a geometry's sub-lines to screen space
fn project_geometry(geometry: &TrailGeometry, projector: &Projector) -> Vec<Vec<[f32; 2]>> {
    geometry
        .lines()
        .map(|line| {
            line.iter()
                .map(|coord| {
                    let position = walkers::lat_lon(coord[1], coord[0]);
                    let screen = projector.project(position);
                    [screen.x, screen.y]
                })
                .collect()
        })
        .collect()
}

fn draw_lines(painter: &egui::Painter, lines: &[Vec<[f32; 2]>], stroke: Stroke) {
    for line in lines {
        if line.len() < 2 {
            continue;
        }
        let points: Vec<egui::Pos2> = line.iter().map(|p| egui::Pos2::new(p[0], p[1])).collect();
        painter.add(egui::Shape::line(points, stroke));
    }
}

/// Parse a `#rrggbb` style color
fn parse_hex_color(hex: &str) -> Option<Color32> {
    let hex = hex.strip_prefix('#')?;
    // The length check counts bytes; non-ASCII input would make the digit
    // slices below land off a char boundary.
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color32::from_rgb(r, g, b))
}

/// Frame-local render-engine answer: trail features whose projected geometry
/// touches a pixel rectangle, in top-to-bottom draw order
struct ProjectedTrails<'a> {
    trails: &'a [TrailFeature],
    screen_lines: &'a [Vec<Vec<[f32; 2]>>],
}

impl RenderedFeatureSource for ProjectedTrails<'_> {
    fn features_intersecting(&self, rect: PixelRect) -> Vec<TrailFeature> {
        // Later-drawn features sit on top, so walk the draw order backwards
        self.screen_lines
            .iter()
            .enumerate()
            .rev()
            .filter(|(_, lines)| lines.iter().any(|line| polyline_hits_rect(line, rect)))
            .map(|(idx, _)| self.trails[idx].clone())
            .collect()
    }
}

impl Plugin for TrailLayerPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _map_memory: &walkers::MapMemory,
    ) {
        let painter = ui.painter();

        let trails = match self.trails.read() {
            Ok(guard) => guard,
            Err(_) => return,
        };

        // Render the network, keeping the projected geometry for hit-testing
        let mut screen_lines: Vec<Vec<Vec<[f32; 2]>>> = Vec::with_capacity(trails.len());
        for trail in trails.iter() {
            let color = trail
                .color
                .as_deref()
                .and_then(parse_hex_color)
                .unwrap_or(DEFAULT_TRAIL_COLOR);
            let lines = project_geometry(&trail.geometry, projector);
            draw_lines(painter, &lines, Stroke::new(self.line_width, color));
            screen_lines.push(lines);
        }

        // Selection overlay: subtle glow under the main stroke
        if let Some(geometry) = &self.overlay.line {
            let lines = project_geometry(geometry, projector);
            draw_lines(
                painter,
                &lines,
                Stroke::new(12.0, SELECTION_COLOR.gamma_multiply(0.28)),
            );
            draw_lines(painter, &lines, Stroke::new(4.0, SELECTION_COLOR));
        }

        // Start/end markers
        for marker in &self.overlay.points {
            let position = walkers::lat_lon(marker.position[1], marker.position[0]);
            let screen = projector.project(position);
            let center = egui::Pos2::new(screen.x, screen.y);
            match marker.kind {
                EndpointKind::Start => {
                    painter.circle(center, 6.0, Color32::WHITE, Stroke::new(3.0, SELECTION_COLOR));
                }
                EndpointKind::End => {
                    painter.circle(center, 6.0, SELECTION_COLOR, Stroke::new(2.0, Color32::WHITE));
                }
            }
        }

        // Pointer probe for tooltip and click handling
        let source = ProjectedTrails {
            trails: &trails,
            screen_lines: &screen_lines,
        };

        let mut probe = PointerProbe::default();
        if let Some(pos) = response.hover_pos() {
            let pointer = [pos.x, pos.y];
            probe.hover_pos = Some(pointer);
            probe.hover = query_features(&source, pointer, HOVER_TOLERANCE_PX);
            if response.clicked() {
                probe.click = Some(query_features(&source, pointer, CLICK_TOLERANCE_PX));
            }
        }

        if let Ok(mut slot) = self.probe.write() {
            *slot = probe;
        }
    }
}
