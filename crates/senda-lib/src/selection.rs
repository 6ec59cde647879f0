//! Selection state machine
//!
//! A single [`SelectionStateManager`] owns the active selection and the two
//! overlay data sources the render engine draws (highlight line, endpoint
//! markers). Each click allocates a fresh monotonically increasing
//! [`SelectionId`]; in-flight enrichment results carry the token they were
//! started under and are discarded when it is no longer current. Selection
//! identity is per-click, not per-feature: re-clicking the same trail still
//! supersedes the previous selection.

use crate::enrich::EnrichmentRequest;
use crate::feature::TrailFeature;
use crate::geometry::GeometryFocus;
use crate::panel::PrimaryPanelModel;

/// Monotonically increasing token identifying one selection
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SelectionId(u64);

impl std::fmt::Display for SelectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The active selection
#[derive(Clone, Debug)]
pub struct Selection {
    pub selection_id: SelectionId,
    pub feature: TrailFeature,
    pub start_point: Option<[f64; 2]>,
    pub end_point: Option<[f64; 2]>,
}

/// Marker kind of an overlay point feature
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EndpointKind {
    Start,
    End,
}

/// One overlay point feature, tagged start or end
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EndpointMarker {
    pub kind: EndpointKind,
    pub position: [f64; 2],
}

/// Overlay data sources exposed to the render engine: zero or one highlighted
/// line geometry and zero to two endpoint markers
#[derive(Clone, Debug, Default)]
pub struct OverlaySources {
    pub line: Option<crate::geometry::TrailGeometry>,
    pub points: Vec<EndpointMarker>,
}

impl OverlaySources {
    pub fn clear(&mut self) {
        self.line = None;
        self.points.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.line.is_none() && self.points.is_empty()
    }
}

/// Synchronous products of a selection transition, handed to the renderer
#[derive(Debug)]
pub struct SelectionEffects {
    pub selection_id: SelectionId,
    /// Camera target; absent for degenerate geometry
    pub focus: Option<GeometryFocus>,
    pub primary: PrimaryPanelModel,
    /// Present iff the feature has an info URL; the caller dispatches it to
    /// the enrichment pipeline after applying the synchronous effects
    pub enrichment: Option<EnrichmentRequest>,
}

/// Result of routing a click through the state machine
#[derive(Debug)]
pub enum ClickOutcome {
    /// No feature resolved: overlays cleared, panels fade out
    Cleared,
    Selected(SelectionEffects),
}

/// Owns the single active selection and mutates the overlay sources
#[derive(Debug, Default)]
pub struct SelectionStateManager {
    current: Option<Selection>,
    next_id: u64,
    overlay: OverlaySources,
}

impl SelectionStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route a click's resolved candidates through the state machine. The
    /// topmost candidate wins; an empty list clears the selection.
    pub fn handle_click(&mut self, mut candidates: Vec<TrailFeature>) -> ClickOutcome {
        if candidates.is_empty() {
            self.clear();
            return ClickOutcome::Cleared;
        }
        ClickOutcome::Selected(self.select(candidates.remove(0)))
    }

    /// Transition to `Selected` with a fresh token, superseding any previous
    /// selection and voiding its in-flight enrichment.
    pub fn select(&mut self, feature: TrailFeature) -> SelectionEffects {
        self.next_id += 1;
        let selection_id = SelectionId(self.next_id);

        let (start_point, end_point) = feature.geometry.endpoints();
        let focus = feature.geometry.bounds_and_center();

        self.overlay.line = Some(feature.geometry.clone());
        self.overlay.points.clear();
        if let Some(position) = start_point {
            self.overlay.points.push(EndpointMarker {
                kind: EndpointKind::Start,
                position,
            });
        }
        if let Some(position) = end_point {
            self.overlay.points.push(EndpointMarker {
                kind: EndpointKind::End,
                position,
            });
        }

        let primary = PrimaryPanelModel::from_feature(&feature, start_point);
        let enrichment = feature.info_url.clone().map(|info_url| EnrichmentRequest {
            selection_id,
            info_url,
            route_name: feature.route_code().to_string(),
        });

        tracing::debug!(
            selection = %selection_id,
            trail = %feature.display_name,
            has_info_url = enrichment.is_some(),
            "selected trail"
        );

        self.current = Some(Selection {
            selection_id,
            feature,
            start_point,
            end_point,
        });

        SelectionEffects {
            selection_id,
            focus,
            primary,
            enrichment,
        }
    }

    /// Transition to `Idle`. Clearing an already-empty state is a no-op in
    /// effect.
    pub fn clear(&mut self) {
        if self.current.is_some() || !self.overlay.is_empty() {
            tracing::debug!("selection cleared");
        }
        self.current = None;
        self.overlay.clear();
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.current.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.current.is_none()
    }

    /// Staleness check for asynchronous results: true iff `id` belongs to the
    /// currently active selection.
    pub fn is_current(&self, id: SelectionId) -> bool {
        self.current
            .as_ref()
            .is_some_and(|sel| sel.selection_id == id)
    }

    pub fn overlay(&self) -> &OverlaySources {
        &self.overlay
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::TrailGeometry;

    fn feature(name: &str, info_url: Option<&str>, geometry: TrailGeometry) -> TrailFeature {
        TrailFeature {
            id: Some("1".to_string()),
            display_name: name.to_string(),
            classification: None,
            length_km: None,
            download_links: Vec::new(),
            info_url: info_url.map(|s| s.to_string()),
            color: None,
            geometry,
        }
    }

    fn line() -> TrailGeometry {
        TrailGeometry::LineString(vec![[0.0, 0.0], [1.0, 1.0], [2.0, 0.0]])
    }

    #[test]
    fn test_select_publishes_overlay_and_endpoints() {
        let mut mgr = SelectionStateManager::new();
        let effects = mgr.select(feature("GR1.A", None, line()));

        assert!(!mgr.is_idle());
        assert!(mgr.overlay().line.is_some());
        assert_eq!(mgr.overlay().points.len(), 2);
        assert_eq!(mgr.overlay().points[0].kind, EndpointKind::Start);
        assert_eq!(mgr.overlay().points[0].position, [0.0, 0.0]);
        assert_eq!(mgr.overlay().points[1].kind, EndpointKind::End);
        assert_eq!(mgr.overlay().points[1].position, [2.0, 0.0]);
        assert!(effects.focus.is_some());
        assert!(effects.enrichment.is_none());
    }

    #[test]
    fn test_degenerate_geometry_still_selects() {
        let mut mgr = SelectionStateManager::new();
        let effects = mgr.select(feature("GR1.A", None, TrailGeometry::LineString(vec![])));

        assert!(!mgr.is_idle());
        assert!(mgr.overlay().points.is_empty());
        assert!(effects.focus.is_none());
        assert!(effects.primary.street_view_url.is_none());
    }

    #[test]
    fn test_tokens_strictly_increase() {
        let mut mgr = SelectionStateManager::new();
        let a = mgr.select(feature("A", None, line())).selection_id;
        let b = mgr.select(feature("B", None, line())).selection_id;
        assert!(b > a);
    }

    #[test]
    fn test_reselecting_same_feature_supersedes_previous_token() {
        let mut mgr = SelectionStateManager::new();
        let f = feature("GR1.A", Some("https://example.com/i"), line());
        let a = mgr.select(f.clone()).selection_id;
        let b = mgr.select(f).selection_id;

        // Selection identity is per-click: the old token is void even though
        // the feature is the same.
        assert!(!mgr.is_current(a));
        assert!(mgr.is_current(b));
    }

    #[test]
    fn test_enrichment_request_only_with_info_url() {
        let mut mgr = SelectionStateManager::new();
        let effects = mgr.select(feature("GR1.A", Some("https://example.com/i"), line()));
        let request = effects.enrichment.unwrap();
        assert_eq!(request.selection_id, effects.selection_id);
        assert_eq!(request.route_name, "GR1");
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut mgr = SelectionStateManager::new();
        mgr.select(feature("A", None, line()));

        mgr.clear();
        assert!(mgr.is_idle());
        assert!(mgr.overlay().is_empty());

        // Second clear leaves the exact same empty state
        mgr.clear();
        assert!(mgr.is_idle());
        assert!(mgr.overlay().is_empty());
    }

    #[test]
    fn test_handle_click_uses_topmost_candidate() {
        let mut mgr = SelectionStateManager::new();
        let outcome = mgr.handle_click(vec![
            feature("top", None, line()),
            feature("below", None, line()),
        ]);
        match outcome {
            ClickOutcome::Selected(effects) => assert_eq!(effects.primary.heading, "top"),
            ClickOutcome::Cleared => panic!("expected a selection"),
        }
    }

    #[test]
    fn test_handle_click_empty_clears() {
        let mut mgr = SelectionStateManager::new();
        mgr.select(feature("A", None, line()));
        assert!(matches!(mgr.handle_click(Vec::new()), ClickOutcome::Cleared));
        assert!(mgr.is_idle());
        assert!(mgr.overlay().is_empty());
    }

    #[test]
    fn test_stale_token_rejected_after_new_selection() {
        let mut mgr = SelectionStateManager::new();
        let a = mgr
            .select(feature("A", Some("https://example.com/a"), line()))
            .selection_id;
        let b = mgr
            .select(feature("B", Some("https://example.com/b"), line()))
            .selection_id;

        // A's enrichment settles late: its token must be rejected.
        assert!(!mgr.is_current(a));
        assert!(mgr.is_current(b));

        // Clearing voids every token.
        mgr.clear();
        assert!(!mgr.is_current(b));
    }
}
