//! Application module
//!
//! Full-screen walkers map with the trail layer plugin, click-driven route
//! selection with an eased camera fly-to, and the two info panels. The
//! selection state machine and the enrichment pipeline live in `senda-lib`;
//! this module wires pointer events into them and applies their effects.

mod plugin;
pub(crate) mod settings;
mod state;
mod ui_panels;

use crate::app::plugin::{PointerProbe, TrailLayerPlugin};
use crate::app::settings::Settings;
use crate::app::state::{AppState, TilesProvider};
use eframe::egui;
use senda_lib::{ClickOutcome, EnrichmentRequest, TrailFeature, enrich, panel::SecondaryPanelModel};
use std::sync::Arc;
use walkers::{
    HttpTiles, Map, MapMemory, TileId,
    sources::{Attribution, OpenStreetMap, TileSource},
};

/// Zoom increment applied when flying to a selected route
const SELECTION_ZOOM_STEP: f64 = 1.3;

/// Absolute zoom cap for the selection fly-to
const MAX_SELECTION_ZOOM: f64 = 12.0;

/// Camera fly-to duration
const FLY_TO_SECS: f64 = 0.8;

/// Custom OpenTopoMap tile source
pub struct OpenTopoMap;

impl TileSource for OpenTopoMap {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://tile.opentopomap.org/{}/{}/{}.png",
            tile_id.zoom, tile_id.x, tile_id.y
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© OpenTopoMap (CC-BY-SA)",
            url: "https://opentopomap.org/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        17
    }
}

/// ESRI World Imagery satellite tile source (note the y/x order)
pub struct EsriWorldImagery;

impl TileSource for EsriWorldImagery {
    fn tile_url(&self, tile_id: TileId) -> String {
        format!(
            "https://services.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{}/{}/{}",
            tile_id.zoom, tile_id.y, tile_id.x
        )
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: "© ESRI, Earthstar Geographics",
            url: "https://www.esri.com/",
            logo_light: None,
            logo_dark: None,
        }
    }

    fn max_zoom(&self) -> u8 {
        18
    }
}

/// Eased fly-to of center and zoom over a fixed duration. Fire-and-forget:
/// superseded by the next selection, never awaited.
struct CameraAnimation {
    from_center: [f64; 2],
    to_center: [f64; 2],
    from_zoom: f64,
    to_zoom: f64,
    started: instant::Instant,
}

impl CameraAnimation {
    fn start(map_memory: &MapMemory, fallback_center: [f64; 2], target: [f64; 2]) -> Self {
        let from_center = map_memory
            .detached()
            .map(|pos| [pos.x(), pos.y()])
            .unwrap_or(fallback_center);
        let from_zoom = map_memory.zoom();
        Self {
            from_center,
            to_center: target,
            from_zoom,
            to_zoom: (from_zoom + SELECTION_ZOOM_STEP).min(MAX_SELECTION_ZOOM),
            started: instant::Instant::now(),
        }
    }

    /// Advance the animation; returns false once it has finished
    fn apply(&self, map_memory: &mut MapMemory) -> bool {
        let t = (self.started.elapsed().as_secs_f64() / FLY_TO_SECS).min(1.0);
        let ease = t * t * (3.0 - 2.0 * t);

        let lon = self.from_center[0] + (self.to_center[0] - self.from_center[0]) * ease;
        let lat = self.from_center[1] + (self.to_center[1] - self.from_center[1]) * ease;
        let zoom = self.from_zoom + (self.to_zoom - self.from_zoom) * ease;

        map_memory.center_at(walkers::lat_lon(lat, lon));
        let _ = map_memory.set_zoom(zoom);

        t < 1.0
    }
}

/// Main application structure
pub struct SendaViewerApp {
    /// Application state (trails, selection, panels, enrichment slot)
    state: AppState,

    tiles_osm: HttpTiles,
    tiles_otm: HttpTiles,
    tiles_esri: HttpTiles,

    /// Map state (camera position, zoom, etc.)
    map_memory: MapMemory,

    /// In-flight selection fly-to, if any
    camera: Option<CameraAnimation>,

    /// Shared pointer probe (written by the plugin each frame)
    probe: Arc<std::sync::RwLock<PointerProbe>>,

    /// Initial map center (lon/lat)
    home: [f64; 2],
}

impl SendaViewerApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let settings = Settings::from_cli();

        // Needed so the secondary panel can show remote route images
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let tiles_osm = HttpTiles::new(OpenStreetMap, cc.egui_ctx.clone());
        let tiles_otm = HttpTiles::new(OpenTopoMap, cc.egui_ctx.clone());
        let tiles_esri = HttpTiles::new(EsriWorldImagery, cc.egui_ctx.clone());

        let home = [settings.center_lon, settings.center_lat];
        let mut map_memory = MapMemory::default();
        map_memory.center_at(walkers::lat_lon(home[1], home[0]));
        let _ = map_memory.set_zoom(settings.zoom);

        let state = AppState::new(&settings);
        tracing::info!(
            pending_files = state.file_loader.pending_files.len(),
            "initialized"
        );

        Self {
            state,
            tiles_osm,
            tiles_otm,
            tiles_esri,
            map_memory,
            camera: None,
            probe: Arc::new(std::sync::RwLock::new(PointerProbe::default())),
            home,
        }
    }

    /// Route a click's candidates through the state machine and apply its
    /// synchronous effects before any enrichment is dispatched
    fn on_click(&mut self, candidates: Vec<TrailFeature>, ctx: &egui::Context) {
        match self.state.selection.handle_click(candidates) {
            ClickOutcome::Cleared => {
                self.state.panels.hide_all();
            }
            ClickOutcome::Selected(effects) => {
                if let Some(focus) = effects.focus {
                    self.camera =
                        Some(CameraAnimation::start(&self.map_memory, self.home, focus.center));
                }

                self.state.panels.primary = Some(effects.primary);
                self.state.panels.primary_fade.show();

                match effects.enrichment {
                    Some(request) => {
                        self.state.panels.secondary = Some(SecondaryPanelModel::Loading);
                        self.state.panels.secondary_fade.show();
                        self.dispatch_enrichment(request, ctx);
                    }
                    None => {
                        self.state.panels.secondary_fade.hide();
                    }
                }
            }
        }
        ctx.request_repaint();
    }

    /// Spawn the enrichment pipeline for a selection. The task only publishes
    /// its outcome; the commit (with the staleness check) happens on the UI
    /// thread in [`Self::process_enrichment_results`].
    fn dispatch_enrichment(&self, request: EnrichmentRequest, ctx: &egui::Context) {
        let fetcher = self.state.fetcher.clone();
        let results = self.state.enrichment_results.clone();
        let ctx = ctx.clone();

        tokio::spawn(async move {
            let outcome = enrich(&*fetcher, request).await;
            results.write().await.push(outcome);
            ctx.request_repaint();
        });
    }

    /// Drain settled enrichment outcomes, committing only those whose token
    /// still belongs to the current selection
    fn process_enrichment_results(&mut self) {
        // Use try_write for non-blocking UI polling.
        let Ok(mut results) = self.state.enrichment_results.try_write() else {
            return;
        };

        for outcome in results.drain(..) {
            if !self.state.selection.is_current(outcome.selection_id) {
                tracing::debug!(
                    selection = %outcome.selection_id,
                    "discarding stale enrichment outcome"
                );
                continue;
            }
            self.state.panels.secondary = Some(SecondaryPanelModel::from_result(&outcome.result));
            self.state.panels.secondary_fade.show();
        }
    }
}

impl eframe::App for SendaViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // Load pending trail files one per frame for UI responsiveness
        if self.state.file_loader.is_busy() {
            self.state.process_pending_files();
            ctx.request_repaint();
        }

        // Capture values we need before the closure
        let trails = self.state.trails.clone();
        let overlay = self.state.selection.overlay().clone();
        let line_width = self.state.ui_settings.line_width;
        let attribution_text = self.state.ui_settings.tiles_provider.attribution();
        let loader_status = self.state.file_loader.status_line();
        let probe = self.probe.clone();

        // Central panel: map view (full screen)
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let plugin = TrailLayerPlugin::new(trails, overlay, line_width, probe);

                let tiles: &mut HttpTiles = match self.state.ui_settings.tiles_provider {
                    TilesProvider::OpenStreetMap => &mut self.tiles_osm,
                    TilesProvider::OpenTopoMap => &mut self.tiles_otm,
                    TilesProvider::EsriWorldImagery => &mut self.tiles_esri,
                };

                let map = Map::new(
                    Some(tiles),
                    &mut self.map_memory,
                    walkers::lat_lon(self.home[1], self.home[0]),
                )
                .with_plugin(plugin);

                ui.add(map);

                let painter = ui.painter();
                let screen_rect = ui.max_rect();
                painter.text(
                    screen_rect.center_bottom() + egui::vec2(0.0, -5.0),
                    egui::Align2::CENTER_BOTTOM,
                    attribution_text,
                    egui::FontId::proportional(10.0),
                    egui::Color32::from_black_alpha(180),
                );

                if let Some(status) = &loader_status {
                    painter.text(
                        screen_rect.left_bottom() + egui::vec2(10.0, -5.0),
                        egui::Align2::LEFT_BOTTOM,
                        status,
                        egui::FontId::proportional(11.0),
                        egui::Color32::from_black_alpha(180),
                    );
                }
            });

        // Pointer handling: tooltip on every sample, clicks into the state
        // machine. The probe was written by the plugin during ui.add(map).
        let (tooltip_probe, click) = match self.probe.write() {
            Ok(mut guard) => {
                let click = guard.click.take();
                let snapshot = PointerProbe {
                    hover: guard.hover.clone(),
                    hover_pos: guard.hover_pos,
                    click: None,
                };
                (snapshot, click)
            }
            Err(_) => (PointerProbe::default(), None),
        };

        ui_panels::render_tooltip(ctx, &tooltip_probe);
        if let Some(candidates) = click {
            self.on_click(candidates, ctx);
        }

        // Advance the selection fly-to
        if let Some(animation) = &self.camera {
            if animation.apply(&mut self.map_memory) {
                ctx.request_repaint();
            } else {
                self.camera = None;
            }
        }

        // Commit settled enrichment results (staleness-guarded)
        self.process_enrichment_results();

        ui_panels::render_selection_panels(ctx, &mut self.state);
        if self.state.panels.is_animating() {
            ctx.request_repaint();
        }
    }
}
