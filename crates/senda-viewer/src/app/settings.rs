use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
/// Senda Viewer - interactive explorer for the FEDME hiking route network
pub struct Settings {
    /// Trail GeoJSON files to load on startup
    #[clap(short, long, value_name = "FILE")]
    pub trails: Vec<PathBuf>,

    /// Initial map center longitude
    #[clap(long, default_value = "-3.7", allow_hyphen_values = true)]
    pub center_lon: f64,

    /// Initial map center latitude
    #[clap(long, default_value = "40.4", allow_hyphen_values = true)]
    pub center_lat: f64,

    /// Initial map zoom level
    #[clap(long, default_value = "6.0")]
    pub zoom: f64,

    /// Trail line width in pixels
    #[clap(long, default_value = "2.0")]
    pub line_width: f32,

    /// Map tiles provider: osm, opentopo or satellite
    #[clap(long, default_value = "osm")]
    pub tiles: String,
}

impl Settings {
    pub fn from_cli() -> Self {
        Self::parse()
    }
}
