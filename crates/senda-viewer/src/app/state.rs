//! Application state management
//!
//! This module holds everything the UI mutates frame to frame: the loaded
//! trail features, the selection state machine, the panel view-models with
//! their fade timers, and the shared slot enrichment tasks publish into.

use crate::app::settings::Settings;
use senda_lib::{
    AllOriginsFetcher, EnrichmentOutcome, SelectionStateManager, TrailFeature,
    load_trail_collection, panel::PrimaryPanelModel, panel::SecondaryPanelModel,
};
use std::path::PathBuf;
use std::sync::Arc;

/// Panel fade transition window, matching the panel CSS of the original style
const PANEL_FADE_SECS: f32 = 0.3;

/// Main application state
pub struct AppState {
    /// Loaded trail features, shared with the map plugin
    pub trails: Arc<std::sync::RwLock<Vec<TrailFeature>>>,

    /// The single active selection and its overlay sources
    pub selection: SelectionStateManager,

    /// Info panel view-models and fade state
    pub panels: PanelState,

    /// Settled enrichment outcomes, pushed by tokio tasks and drained by the
    /// UI thread each frame
    pub enrichment_results: Arc<tokio::sync::RwLock<Vec<EnrichmentOutcome>>>,

    /// Page-fetch service client shared across enrichment tasks
    pub fetcher: Arc<AllOriginsFetcher>,

    /// Current UI settings
    pub ui_settings: UiSettings,

    /// Trail file loading state
    pub file_loader: FileLoader,
}

/// UI-specific settings that can be adjusted at runtime
#[derive(Clone)]
pub struct UiSettings {
    /// Trail line width in pixels
    pub line_width: f32,

    /// Map tiles provider
    pub tiles_provider: TilesProvider,
}

/// Available map tile providers
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TilesProvider {
    OpenStreetMap,
    OpenTopoMap,
    /// Satellite backdrop the route network is overlaid on
    EsriWorldImagery,
}

impl TilesProvider {
    pub fn from_key(key: &str) -> Self {
        match key {
            "opentopo" => Self::OpenTopoMap,
            "satellite" => Self::EsriWorldImagery,
            _ => Self::OpenStreetMap,
        }
    }

    pub fn attribution(&self) -> &'static str {
        match self {
            Self::OpenStreetMap => "© OpenStreetMap contributors",
            Self::OpenTopoMap => "© OpenTopoMap (CC-BY-SA)",
            Self::EsriWorldImagery => "© ESRI, Earthstar Geographics",
        }
    }
}

/// Trail file loading state
#[derive(Default)]
pub struct FileLoader {
    /// Files pending load
    pub pending_files: Vec<PathBuf>,

    /// Load errors
    pub errors: Vec<(PathBuf, String)>,

    /// Successfully loaded files with their feature counts
    pub loaded_files: Vec<(PathBuf, usize)>,
}

impl FileLoader {
    pub fn is_busy(&self) -> bool {
        !self.pending_files.is_empty()
    }

    /// One-line load status for the map footer: progress while files are
    /// pending, a load summary when anything failed, nothing otherwise
    pub fn status_line(&self) -> Option<String> {
        if self.is_busy() {
            return Some(format!(
                "Cargando {} archivo(s) de rutas…",
                self.pending_files.len()
            ));
        }
        if self.errors.is_empty() {
            return None;
        }
        let features: usize = self.loaded_files.iter().map(|(_, count)| count).sum();
        Some(format!(
            "{} rutas cargadas, {} archivo(s) con error",
            features,
            self.errors.len()
        ))
    }
}

/// View-models and fades for the two info panels
#[derive(Default)]
pub struct PanelState {
    pub primary: Option<PrimaryPanelModel>,
    pub primary_fade: PanelFade,
    pub secondary: Option<SecondaryPanelModel>,
    pub secondary_fade: PanelFade,
}

impl PanelState {
    /// Fade out whatever is visible; the models stay until fully hidden so
    /// the fade-out still has content to draw
    pub fn hide_all(&mut self) {
        self.primary_fade.hide();
        self.secondary_fade.hide();
    }

    /// Drop models whose fade-out finished
    pub fn tick(&mut self) {
        if self.primary_fade.is_hidden() {
            self.primary = None;
        }
        if self.secondary_fade.is_hidden() {
            self.secondary = None;
        }
    }

    pub fn is_animating(&self) -> bool {
        self.primary_fade.is_animating() || self.secondary_fade.is_animating()
    }
}

/// Visible/hidden transition of one panel: 300 ms fade in or out, then the
/// panel is physically hidden
#[derive(Clone, Copy, Debug, Default)]
pub struct PanelFade {
    phase: FadePhase,
}

#[derive(Clone, Copy, Debug, Default)]
enum FadePhase {
    #[default]
    Hidden,
    In {
        since: instant::Instant,
    },
    Out {
        since: instant::Instant,
    },
}

impl PanelFade {
    pub fn show(&mut self) {
        if !matches!(self.phase, FadePhase::In { .. }) {
            self.phase = FadePhase::In {
                since: instant::Instant::now(),
            };
        }
    }

    pub fn hide(&mut self) {
        if matches!(self.phase, FadePhase::In { .. }) {
            self.phase = FadePhase::Out {
                since: instant::Instant::now(),
            };
        }
    }

    /// Current opacity, 0.0 to 1.0
    pub fn alpha(&self) -> f32 {
        match self.phase {
            FadePhase::Hidden => 0.0,
            FadePhase::In { since } => (since.elapsed().as_secs_f32() / PANEL_FADE_SECS).min(1.0),
            FadePhase::Out { since } => {
                (1.0 - since.elapsed().as_secs_f32() / PANEL_FADE_SECS).max(0.0)
            }
        }
    }

    /// Whether the panel is fully hidden (fade-out elapsed or never shown)
    pub fn is_hidden(&self) -> bool {
        match self.phase {
            FadePhase::Hidden => true,
            FadePhase::Out { since } => since.elapsed().as_secs_f32() >= PANEL_FADE_SECS,
            FadePhase::In { .. } => false,
        }
    }

    pub fn is_animating(&self) -> bool {
        match self.phase {
            FadePhase::Hidden => false,
            FadePhase::In { since } | FadePhase::Out { since } => {
                since.elapsed().as_secs_f32() < PANEL_FADE_SECS
            }
        }
    }
}

impl AppState {
    /// Create new application state from CLI settings
    pub fn new(settings: &Settings) -> Self {
        let ui_settings = UiSettings {
            line_width: settings.line_width,
            tiles_provider: TilesProvider::from_key(&settings.tiles),
        };

        let file_loader = FileLoader {
            pending_files: settings.trails.clone(),
            ..Default::default()
        };

        Self {
            trails: Arc::new(std::sync::RwLock::new(Vec::new())),
            selection: SelectionStateManager::new(),
            panels: PanelState::default(),
            enrichment_results: Arc::new(tokio::sync::RwLock::new(Vec::new())),
            fetcher: Arc::new(AllOriginsFetcher::new()),
            ui_settings,
            file_loader,
        }
    }

    /// Load one pending trail file, if any. One file per frame keeps the UI
    /// responsive during startup.
    pub fn process_pending_files(&mut self) {
        let Some(path) = self.file_loader.pending_files.pop() else {
            return;
        };

        match load_trail_collection(&path) {
            Ok(features) => {
                let count = features.len();
                match self.trails.write() {
                    Ok(mut trails) => trails.extend(features),
                    Err(_) => {
                        tracing::error!("trail store lock poisoned");
                        return;
                    }
                }
                tracing::info!(file = %path.display(), count, "loaded trail collection");
                self.file_loader.loaded_files.push((path, count));
            }
            Err(err) => {
                tracing::warn!(file = %path.display(), error = %err, "failed to load trails");
                self.file_loader.errors.push((path, err.to_string()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panel_fade_starts_hidden() {
        let fade = PanelFade::default();
        assert!(fade.is_hidden());
        assert_eq!(fade.alpha(), 0.0);
    }

    #[test]
    fn test_panel_fade_show_then_hide() {
        let mut fade = PanelFade::default();
        fade.show();
        assert!(!fade.is_hidden());
        assert!(fade.is_animating());

        fade.hide();
        assert!(fade.is_animating());
        // Just after hiding the panel is still in its transition window
        assert!(!fade.is_hidden());
    }

    #[test]
    fn test_hide_without_show_is_a_noop() {
        let mut fade = PanelFade::default();
        fade.hide();
        assert!(fade.is_hidden());
        assert!(!fade.is_animating());
    }

    #[test]
    fn test_file_loader_status_line() {
        let mut loader = FileLoader::default();
        assert_eq!(loader.status_line(), None);

        loader.pending_files.push(PathBuf::from("a.geojson"));
        assert_eq!(
            loader.status_line().unwrap(),
            "Cargando 1 archivo(s) de rutas…"
        );

        loader.pending_files.clear();
        loader.loaded_files.push((PathBuf::from("a.geojson"), 12));
        // Loads without errors need no footer line
        assert_eq!(loader.status_line(), None);

        loader
            .errors
            .push((PathBuf::from("b.geojson"), "bad json".to_string()));
        assert_eq!(
            loader.status_line().unwrap(),
            "12 rutas cargadas, 1 archivo(s) con error"
        );
    }

    #[test]
    fn test_tiles_provider_keys() {
        assert_eq!(TilesProvider::from_key("osm"), TilesProvider::OpenStreetMap);
        assert_eq!(
            TilesProvider::from_key("satellite"),
            TilesProvider::EsriWorldImagery
        );
        // Unknown keys fall back to OSM
        assert_eq!(
            TilesProvider::from_key("nonsense"),
            TilesProvider::OpenStreetMap
        );
    }
}
