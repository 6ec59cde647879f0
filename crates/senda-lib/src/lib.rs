//! Senda Library - Core Logic for Interactive Trail Selection
//!
//! This library contains the map-independent half of the trail viewer: the
//! trail data model, spatial hit-test queries against rendered features, the
//! single-selection state machine with its overlay sources, and the
//! detail-enrichment pipeline that scrapes the external trail pages.
//!
//! # Architecture
//!
//! - **[`TrailFeature`]**: Metadata and geometry of one rendered trail
//! - **[`query_features`]**: Pointer position to ranked candidate features
//! - **[`SelectionStateManager`]**: Owns the active selection and overlays
//! - **[`enrich`]**: Concurrent detail-page and image lookups, guarded by a
//!   monotonically increasing selection token
//!
//! The render engine and the panel surface stay on the other side of two
//! seams: [`RenderedFeatureSource`] answers "what is drawn inside this pixel
//! rectangle", and the panel view-models in [`panel`] are plain data applied
//! by whatever renderer hosts the library.

mod enrich;
mod feature;
mod fetch;
mod geometry;
pub mod panel;
mod query;
mod selection;
mod source;

// Public API exports
pub use enrich::{
    EnrichmentOutcome, EnrichmentRequest, EnrichmentResult, FetchError, PageFetcher, enrich,
};
pub use feature::{LinkKind, RouteKind, TrailFeature};
pub use fetch::AllOriginsFetcher;
pub use geometry::{GeometryFocus, TrailGeometry};
pub use query::{
    CLICK_TOLERANCE_PX, HOVER_TOLERANCE_PX, PixelRect, RenderedFeatureSource, polyline_hits_rect,
    query_features,
};
pub use selection::{
    ClickOutcome, EndpointKind, EndpointMarker, OverlaySources, Selection, SelectionEffects,
    SelectionId, SelectionStateManager,
};
pub use source::{load_trail_collection, parse_trail_collection};

/// Error types for trail data ingest
#[derive(Debug, thiserror::Error)]
pub enum TrailDataError {
    #[error("GeoJSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("not a FeatureCollection: {0}")]
    NotACollection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrailDataError>;
