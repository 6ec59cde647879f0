//! Panel view-models
//!
//! Pure functions computing what the info panels display from a
//! [`TrailFeature`] and an enrichment result. Keeping these as plain data
//! keeps the selection state machine testable without any UI toolkit; the
//! viewer applies them to its panel surface.

use crate::enrich::EnrichmentResult;
use crate::feature::{LinkKind, RouteKind, TrailFeature};

/// Manual download-center fallback when the tile carries no direct link
pub const DOWNLOAD_CENTER_URL: &str =
    "https://centrodedescargas.cnig.es/CentroDescargas/senderos-fedme";

/// Street-View-style panorama link at a geographic coordinate (lon/lat)
pub fn street_view_url(coord: [f64; 2]) -> String {
    format!(
        "https://www.google.com/maps/@?api=1&map_action=pano&viewpoint={},{}&heading=0&pitch=0&fov=80",
        coord[1], coord[0]
    )
}

/// One labeled metadata row of the primary panel
#[derive(Clone, Debug, PartialEq)]
pub struct PanelField {
    pub label: String,
    pub value: String,
}

/// One download/action button of the primary panel
#[derive(Clone, Debug, PartialEq)]
pub struct DownloadButton {
    pub label: String,
    pub url: String,
}

/// Everything the primary (structured) panel renders, computed synchronously
/// at selection time
#[derive(Clone, Debug)]
pub struct PrimaryPanelModel {
    /// Route code heading (text before the first `.`)
    pub heading: String,
    pub badge: Option<RouteKind>,
    pub fields: Vec<PanelField>,
    pub downloads: Vec<DownloadButton>,
    /// Panorama link at the start coordinate, when one exists
    pub street_view_url: Option<String>,
    pub info_url: Option<String>,
}

impl PrimaryPanelModel {
    pub fn from_feature(feature: &TrailFeature, start: Option<[f64; 2]>) -> Self {
        let mut fields = Vec::new();
        if !feature.route_title().is_empty() {
            fields.push(PanelField {
                label: "Nombre".to_string(),
                value: feature.route_title().to_string(),
            });
        }
        if let Some(id) = &feature.id {
            fields.push(PanelField {
                label: "Id".to_string(),
                value: id.clone(),
            });
        }
        if let Some(km) = feature.length_km {
            fields.push(PanelField {
                label: "Longitud".to_string(),
                value: format!("{} km", km),
            });
        }

        // GPX and KML first, then the remaining link kinds in source order
        let mut downloads = Vec::new();
        for kind in [LinkKind::Gpx, LinkKind::Kml] {
            if let Some(url) = feature.link(&kind) {
                downloads.push(DownloadButton {
                    label: kind.label(),
                    url: url.to_string(),
                });
            }
        }
        for (kind, url) in &feature.download_links {
            if matches!(kind, LinkKind::Gpx | LinkKind::Kml) {
                continue;
            }
            downloads.push(DownloadButton {
                label: kind.label(),
                url: url.clone(),
            });
        }

        Self {
            heading: feature.route_code().to_string(),
            badge: feature.route_kind(),
            fields,
            downloads,
            street_view_url: start.map(street_view_url),
            info_url: feature.info_url.clone(),
        }
    }

    /// Whether the panel must point at the manual download center instead of
    /// direct links
    pub fn needs_download_fallback(&self) -> bool {
        self.downloads.is_empty()
    }
}

/// State of the secondary (enrichment) panel
#[derive(Clone, Debug, PartialEq)]
pub enum SecondaryPanelModel {
    /// Lookups in flight
    Loading,
    /// At least one lookup produced something: image above divider above text
    Content {
        image_url: Option<String>,
        detail_html: Option<String>,
    },
    /// Both lookups came back empty; direct the user to the download center
    NoDetails,
}

impl SecondaryPanelModel {
    pub fn from_result(result: &EnrichmentResult) -> Self {
        if result.detail_html.is_none() && result.image_url.is_none() {
            Self::NoDetails
        } else {
            Self::Content {
                image_url: result.image_url.clone(),
                detail_html: result.detail_html.clone(),
            }
        }
    }
}

/// Flatten an HTML fragment to displayable text, collapsing whitespace runs.
/// The viewer has no HTML surface, so detail content is rendered as text.
pub fn fragment_to_text(html: &str) -> String {
    let fragment = scraper::Html::parse_fragment(html);
    let mut out = String::new();
    for piece in fragment.root_element().text() {
        let trimmed = piece.trim();
        if trimmed.is_empty() {
            continue;
        }
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(trimmed);
    }
    out
}
