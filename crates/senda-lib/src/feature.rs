//! Trail feature model
//!
//! A [`TrailFeature`] is the typed view of one rendered vector feature: its
//! identifying attributes, download links and geometry. Features are
//! re-materialized from the render engine on every query and never persisted.

use crate::geometry::TrailGeometry;

/// Kind of a download link attached to a trail feature
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinkKind {
    Gpx,
    Kml,
    Url,
    Download,
    /// Any other key carrying a URL (e.g. `gpx_url`, `kml_url`)
    Other(String),
}

impl LinkKind {
    /// Parse a property key into a link kind, or `None` if the key does not
    /// carry a download URL.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "gpx" => Some(Self::Gpx),
            "kml" => Some(Self::Kml),
            "url" => Some(Self::Url),
            "download" => Some(Self::Download),
            "gpx_url" | "kml_url" => Some(Self::Other(key.to_string())),
            _ => None,
        }
    }

    /// Button label for this link kind
    pub fn label(&self) -> String {
        match self {
            Self::Gpx => "GPX".to_string(),
            Self::Kml => "KML".to_string(),
            Self::Url => "URL".to_string(),
            Self::Download => "DOWNLOAD".to_string(),
            Self::Other(key) => key.to_uppercase(),
        }
    }
}

/// Route type badge derived from the route code or classification
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteKind {
    /// Gran Recorrido
    Gr,
    /// Pequeño Recorrido
    Pr,
    /// Sendero Local
    Sl,
}

impl RouteKind {
    pub fn short_name(&self) -> &'static str {
        match self {
            Self::Gr => "GR",
            Self::Pr => "PR",
            Self::Sl => "SL",
        }
    }
}

/// One rendered trail feature with its source-provided metadata
#[derive(Clone, Debug)]
pub struct TrailFeature {
    /// Source-provided identifier, when present
    pub id: Option<String>,
    /// Raw label; may embed a route code before the first `.`
    pub display_name: String,
    /// Free-text category (`tipo`/`clasificacion`), e.g. "Gran Recorrido"
    pub classification: Option<String>,
    /// Length in kilometers, when the tile carries it
    pub length_km: Option<f64>,
    /// Download links in source order
    pub download_links: Vec<(LinkKind, String)>,
    /// External detail-page URL (`url_info`)
    pub info_url: Option<String>,
    /// Line color from the style, as a hex string when present
    pub color: Option<String>,
    pub geometry: TrailGeometry,
}

impl TrailFeature {
    /// Whether this feature carries at least one identifying attribute.
    ///
    /// Render-engine queries may return unrelated layers (e.g. the raster
    /// backdrop); those never qualify as selection candidates.
    pub fn is_identified(&self) -> bool {
        !self.display_name.trim().is_empty() || self.id.is_some()
    }

    /// Route code: the part of the display name before the first `.`, or the
    /// whole name if there is no `.`. Used for the heading and the tooltip.
    pub fn route_code(&self) -> &str {
        match self.display_name.split_once('.') {
            Some((code, _)) => code.trim(),
            None => self.display_name.trim(),
        }
    }

    /// Human title: the part of the display name after the first `.`, or the
    /// code itself if the name embeds no title.
    pub fn route_title(&self) -> &str {
        match self.display_name.split_once('.') {
            Some((_, title)) => title.trim(),
            None => self.route_code(),
        }
    }

    /// Derive the route type badge.
    ///
    /// Tests the code's leading token, then the classification text, for GR,
    /// PR and SL in that order; the first match wins. The leading-token test
    /// accepts "GR10" and "PR-A 12" but not "GRAN SENDA"; the classification
    /// test is a plain case-insensitive substring match.
    pub fn route_kind(&self) -> Option<RouteKind> {
        let code = self.route_code().to_uppercase();
        let meta = self
            .classification
            .as_deref()
            .unwrap_or_default()
            .to_uppercase();

        for kind in [RouteKind::Gr, RouteKind::Pr, RouteKind::Sl] {
            let prefix = kind.short_name();
            if leading_token_matches(&code, prefix) || meta.contains(prefix) {
                return Some(kind);
            }
        }
        None
    }

    /// First download link of the given kind, when present
    pub fn link(&self, kind: &LinkKind) -> Option<&str> {
        self.download_links
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, url)| url.as_str())
    }
}

/// Leading-token match: `code` starts with `prefix` and the character right
/// after it, if any, is not alphabetic. Both are expected uppercased.
fn leading_token_matches(code: &str, prefix: &str) -> bool {
    match code.strip_prefix(prefix) {
        Some(rest) => !rest.chars().next().is_some_and(|c| c.is_alphabetic()),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feature(name: &str, classification: Option<&str>) -> TrailFeature {
        TrailFeature {
            id: None,
            display_name: name.to_string(),
            classification: classification.map(|s| s.to_string()),
            length_km: None,
            download_links: Vec::new(),
            info_url: None,
            color: None,
            geometry: TrailGeometry::LineString(vec![]),
        }
    }

    #[test]
    fn test_code_and_title_split_on_first_dot() {
        let f = feature("GR10.Camino del Norte", None);
        assert_eq!(f.route_code(), "GR10");
        assert_eq!(f.route_title(), "Camino del Norte");
        assert_eq!(f.route_kind(), Some(RouteKind::Gr));
    }

    #[test]
    fn test_name_without_dot_is_its_own_code() {
        let f = feature("Ruta Local", None);
        assert_eq!(f.route_code(), "Ruta Local");
        assert_eq!(f.route_title(), "Ruta Local");
    }

    #[test]
    fn test_badge_from_leading_token_without_classification() {
        let f = feature("PR-A 12", None);
        assert_eq!(f.route_kind(), Some(RouteKind::Pr));
    }

    #[test]
    fn test_no_badge_when_neither_code_nor_classification_match() {
        let f = feature("Ruta Local", Some("Sendero Local"));
        assert_eq!(f.route_kind(), None);
    }

    #[test]
    fn test_badge_from_classification_substring() {
        let f = feature("Camino Viejo", Some("Gran Recorrido GR"));
        assert_eq!(f.route_kind(), Some(RouteKind::Gr));
    }

    #[test]
    fn test_leading_token_rejects_longer_word() {
        // "GRAN" must not count as a GR code on its own
        let f = feature("GRAN SENDA", None);
        assert_eq!(f.route_kind(), None);
    }

    #[test]
    fn test_identification_requires_name_or_id() {
        let mut f = feature("", None);
        assert!(!f.is_identified());
        f.id = Some("42".to_string());
        assert!(f.is_identified());
    }

    #[test]
    fn test_link_lookup_by_kind() {
        let mut f = feature("GR10.X", None);
        f.download_links = vec![
            (LinkKind::Gpx, "https://example.com/a.gpx".to_string()),
            (LinkKind::Kml, "https://example.com/a.kml".to_string()),
        ];
        assert_eq!(f.link(&LinkKind::Gpx), Some("https://example.com/a.gpx"));
        assert_eq!(f.link(&LinkKind::Url), None);
    }
}
