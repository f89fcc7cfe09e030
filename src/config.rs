use std::path::PathBuf;

use clap::Parser;

use crate::data::model::{Dataset, Purpose, TransportMode};
use crate::regions::MapStyle;
use crate::selection::Selection;
use crate::views::geo::DEFAULT_MARKER_SCALE;

/// Startup configuration. Every flag can also come from the environment.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "london-tourism",
    version,
    about = "Interactive dashboard of London inbound tourism statistics"
)]
pub struct Config {
    /// Tourism table (.csv, .json or .parquet). Asked for with a file
    /// dialog when omitted.
    #[arg(long, env = "LONDON_TOURISM_DATA")]
    pub data: Option<PathBuf>,

    /// Marker size for a probability of 1.
    #[arg(
        long,
        env = "LONDON_TOURISM_MARKER_SCALE",
        default_value_t = DEFAULT_MARKER_SCALE,
        value_parser = parse_marker_scale
    )]
    pub marker_scale: f64,

    /// Initial map style: light, dark, satellite or custom.
    #[arg(long, env = "LONDON_TOURISM_MAP_STYLE", default_value = "dark")]
    pub map_style: MapStyle,

    /// Initial region used to frame the map.
    #[arg(long, env = "LONDON_TOURISM_REGION", default_value = "Western Europe")]
    pub region: String,

    /// Initial transport mode: air, sea or tunnel.
    #[arg(long, env = "LONDON_TOURISM_MODE", default_value = "air")]
    pub mode: TransportMode,

    /// Initial visit purpose: holiday, business, vfr or miscellaneous.
    #[arg(long, env = "LONDON_TOURISM_PURPOSE", default_value = "holiday")]
    pub purpose: Purpose,

    /// Log filter used when RUST_LOG is not set.
    #[arg(long, env = "LONDON_TOURISM_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Marker sizes scale with this value, so it must be a positive finite number.
fn parse_marker_scale(s: &str) -> Result<f64, String> {
    let scale: f64 = s.trim().parse().map_err(|e| format!("{e}"))?;
    if scale.is_finite() && scale > 0.0 {
        Ok(scale)
    } else {
        Err(format!("expected a positive number, got {s}"))
    }
}

impl Config {
    /// Selection at startup: the configured facets and the dataset's first
    /// year.
    pub fn initial_selection(&self, dataset: &Dataset) -> Selection {
        let year = dataset.year_range().map_or(0, |(first, _)| first);
        Selection::new(self.map_style, self.region.clone(), year, self.mode, self.purpose)
    }
}
