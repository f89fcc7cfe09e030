use eframe::egui::Color32;

use super::fmt_measure;
use crate::color::ColorScale;
use crate::data::filter::{Criteria, filter};
use crate::data::model::Dataset;
use crate::regions::{MapStyle, MapView, region_view};
use crate::selection::Selection;

/// Marker size for a probability of 1.
pub const DEFAULT_MARKER_SCALE: f64 = 10.0;

/// One map marker per row.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    /// Identity payload, used as the cross-filter key when hovered.
    pub market: String,
    pub lon: f64,
    pub lat: f64,
    pub probability: f64,
    /// `probability × marker_scale`.
    pub size: f64,
    pub color: Color32,
    /// Hover text.
    pub label: String,
}

/// Everything the map panel draws.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoView {
    pub style: MapStyle,
    pub view: MapView,
    pub markers: Vec<Marker>,
    /// Matching rows left off the map for lack of a probability or
    /// coordinates.
    pub excluded: usize,
}

/// Markers for the selected year, mode and purpose. The region only frames
/// the map; it does not filter rows.
///
/// Rows without a usable probability are excluded rather than drawn at some
/// arbitrary size; rows without coordinates cannot be placed and are
/// excluded as well.
pub fn render_geo(dataset: &Dataset, selection: &Selection, marker_scale: f64) -> GeoView {
    let criteria = Criteria::default()
        .year(selection.year)
        .mode(selection.mode)
        .purpose(selection.purpose);
    let rows = filter(dataset, &criteria);
    let scale = ColorScale::magnitude();

    let markers: Vec<Marker> = rows
        .iter()
        .filter_map(|rec| {
            let probability = rec.probability?;
            let [lon, lat] = rec.position()?;
            Some(Marker {
                market: rec.market.clone(),
                lon,
                lat,
                probability,
                size: probability * marker_scale,
                color: scale.color_at(probability),
                label: format!(
                    "{} | actual stay {} | predicted stay {} | P(stay 15+ days) {}",
                    rec.market,
                    fmt_measure(rec.duration),
                    fmt_measure(rec.predicted_stay),
                    probability
                ),
            })
        })
        .collect();

    let excluded = rows.len() - markers.len();
    if excluded > 0 {
        log::debug!("{excluded} rows without probability or coordinates left off the map");
    }

    GeoView {
        style: selection.map_style,
        view: region_view(&selection.region),
        markers,
        excluded,
    }
}

/// The marker closest to `point` (`[lon, lat]`), if one lies within
/// `max_distance`. Ties go to the marker drawn first.
pub fn nearest_marker<'a>(
    markers: &'a [Marker],
    point: [f64; 2],
    max_distance: f64,
) -> Option<&'a Marker> {
    markers
        .iter()
        .map(|m| (m, (m.lon - point[0]).hypot(m.lat - point[1])))
        .filter(|(_, d)| *d <= max_distance)
        .fold(None, |best: Option<(&Marker, f64)>, (m, d)| match best {
            Some((_, bd)) if bd <= d => best,
            _ => Some((m, d)),
        })
        .map(|(m, _)| m)
}
