//! Trail vector source ingest
//!
//! Parses a GeoJSON FeatureCollection of trail features into the typed model.
//! The property bag is the subset the tile service publishes
//! (`nombre|name, id, tipo, clasificacion, longitud, gpx, gpx_url, kml,
//! kml_url, url, download, url_info`); missing fields become explicit
//! optionals. Non-line geometries are skipped, not errors.

use crate::feature::{LinkKind, TrailFeature};
use crate::geometry::TrailGeometry;
use crate::{Result, TrailDataError};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Property keys that may carry a download URL, in display order
const LINK_KEYS: [&str; 6] = ["gpx", "gpx_url", "kml", "kml_url", "url", "download"];

#[derive(Debug, Deserialize)]
struct RawCollection {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
    #[serde(default)]
    properties: serde_json::Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    coordinates: Value,
}

/// Load trail features from a GeoJSON file
pub fn load_trail_collection(path: &Path) -> Result<Vec<TrailFeature>> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    let raw: RawCollection = serde_json::from_reader(reader)?;
    collect_features(raw)
}

/// Parse trail features from GeoJSON text
pub fn parse_trail_collection(text: &str) -> Result<Vec<TrailFeature>> {
    let raw: RawCollection = serde_json::from_str(text)?;
    collect_features(raw)
}

fn collect_features(raw: RawCollection) -> Result<Vec<TrailFeature>> {
    if raw.kind != "FeatureCollection" {
        return Err(TrailDataError::NotACollection(raw.kind));
    }

    let mut trails = Vec::with_capacity(raw.features.len());
    let mut skipped = 0usize;
    for feature in raw.features {
        match convert_feature(feature) {
            Some(trail) => trails.push(trail),
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        tracing::debug!(skipped, kept = trails.len(), "skipped non-line features");
    }
    Ok(trails)
}

fn convert_feature(raw: RawFeature) -> Option<TrailFeature> {
    let geometry = raw.geometry.and_then(convert_geometry)?;
    let props = &raw.properties;

    let display_name = string_prop(props, "nombre")
        .or_else(|| string_prop(props, "name"))
        .unwrap_or_default();

    // A root-level id takes precedence over the property bag
    let id = raw
        .id
        .as_ref()
        .and_then(value_to_string)
        .or_else(|| string_prop(props, "id"));

    let classification =
        string_prop(props, "tipo").or_else(|| string_prop(props, "clasificacion"));

    let length_km = props.get("longitud").and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    });

    let mut download_links = Vec::new();
    for key in LINK_KEYS {
        if let (Some(kind), Some(url)) = (LinkKind::from_key(key), string_prop(props, key)) {
            download_links.push((kind, url));
        }
    }

    Some(TrailFeature {
        id,
        display_name,
        classification,
        length_km,
        download_links,
        info_url: string_prop(props, "url_info"),
        color: string_prop(props, "color"),
        geometry,
    })
}

fn convert_geometry(raw: RawGeometry) -> Option<TrailGeometry> {
    match raw.kind.as_str() {
        "LineString" => {
            let coords: Vec<Vec<f64>> = serde_json::from_value(raw.coordinates).ok()?;
            Some(TrailGeometry::LineString(positions(coords)))
        }
        "MultiLineString" => {
            let coords: Vec<Vec<Vec<f64>>> = serde_json::from_value(raw.coordinates).ok()?;
            Some(TrailGeometry::MultiLineString(
                coords.into_iter().map(positions).collect(),
            ))
        }
        _ => None,
    }
}

/// GeoJSON positions may carry altitude; keep the lon/lat pair
fn positions(coords: Vec<Vec<f64>>) -> Vec<[f64; 2]> {
    coords
        .into_iter()
        .filter(|c| c.len() >= 2)
        .map(|c| [c[0], c[1]])
        .collect()
}

fn string_prop(props: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    props.get(key).and_then(value_to_string)
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // The fixture embeds `"#ff0000"`, so the raw string needs the wider
    // delimiter.
    const SAMPLE: &str = r##"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": {
                    "type": "LineString",
                    "coordinates": [[-3.7, 40.4, 650.0], [-3.6, 40.5]]
                },
                "properties": {
                    "nombre": "GR10.Camino del Norte",
                    "id": 7,
                    "tipo": "Gran Recorrido",
                    "longitud": "153.4",
                    "gpx": "https://example.com/gr10.gpx",
                    "url_info": "https://example.com/gr10",
                    "color": "#ff0000"
                }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-3.7, 40.4] },
                "properties": { "name": "refugio" }
            },
            {
                "type": "Feature",
                "geometry": {
                    "type": "MultiLineString",
                    "coordinates": [[[0.0, 0.0], [1.0, 1.0]], [[2.0, 2.0], [3.0, 3.0]]]
                },
                "properties": { "name": "PR-A 12" }
            }
        ]
    }"##;

    #[test]
    fn test_parse_keeps_line_features_only() {
        let trails = parse_trail_collection(SAMPLE).unwrap();
        assert_eq!(trails.len(), 2);
    }

    #[test]
    fn test_properties_are_typed() {
        let trails = parse_trail_collection(SAMPLE).unwrap();
        let gr10 = &trails[0];
        assert_eq!(gr10.display_name, "GR10.Camino del Norte");
        assert_eq!(gr10.id.as_deref(), Some("7"));
        assert_eq!(gr10.classification.as_deref(), Some("Gran Recorrido"));
        assert_eq!(gr10.length_km, Some(153.4));
        assert_eq!(gr10.link(&LinkKind::Gpx), Some("https://example.com/gr10.gpx"));
        assert_eq!(gr10.info_url.as_deref(), Some("https://example.com/gr10"));
        assert_eq!(gr10.color.as_deref(), Some("#ff0000"));
    }

    #[test]
    fn test_altitude_component_is_dropped() {
        let trails = parse_trail_collection(SAMPLE).unwrap();
        match &trails[0].geometry {
            TrailGeometry::LineString(coords) => {
                assert_eq!(coords[0], [-3.7, 40.4]);
            }
            other => panic!("expected LineString, got {other:?}"),
        }
    }

    #[test]
    fn test_multilinestring_roundtrip() {
        let trails = parse_trail_collection(SAMPLE).unwrap();
        let (start, end) = trails[1].geometry.endpoints();
        assert_eq!(start, Some([0.0, 0.0]));
        assert_eq!(end, Some([3.0, 3.0]));
    }

    #[test]
    fn test_rejects_non_collections() {
        let err = parse_trail_collection(r#"{"type": "Feature"}"#).unwrap_err();
        assert!(matches!(err, TrailDataError::NotACollection(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        assert!(parse_trail_collection("senderos").is_err());
    }
}
