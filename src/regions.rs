use std::fmt;
use std::str::FromStr;

use crate::data::model::UnknownFacet;

/// Map framing for a region: center and zoom level.
///
/// Zoom follows web-map convention: level 0 shows the whole world and each
/// level halves the visible span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    pub lat: f64,
    pub lon: f64,
    pub zoom: u8,
}

impl MapView {
    pub const WORLD: MapView = MapView {
        lat: 0.0,
        lon: 0.0,
        zoom: 0,
    };

    /// Visible `[lon, lat]` min and max corners.
    pub fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let scale = f64::from(1u32 << self.zoom);
        let half_lon = 180.0 / scale;
        let half_lat = 90.0 / scale;
        (
            [self.lon - half_lon, self.lat - half_lat],
            [self.lon + half_lon, self.lat + half_lat],
        )
    }
}

/// Region dropdown entries in display order, with their map framing.
pub const REGIONS: [(&str, MapView); 20] = [
    ("World", MapView::WORLD),
    ("Central Africa", view(0.0, 20.0, 3)),
    ("Central America & South America", view(-15.0, -60.0, 2)),
    ("Central Europe", view(50.0, 0.0, 2)),
    ("Eastern Europe", view(40.0, 30.0, 3)),
    ("Eastern Africa", view(10.0, 40.0, 3)),
    ("North & Central Asia", view(30.0, 100.0, 3)),
    ("North Africa", view(30.0, 20.0, 3)),
    ("Northern Europe", view(70.0, 0.0, 3)),
    ("North America", view(40.0, -100.0, 2)),
    ("South Africa", view(-20.0, 0.0, 3)),
    ("South Asia", view(0.0, 80.0, 3)),
    ("Southeast Asia", view(0.0, 120.0, 3)),
    ("Southeast Europe", view(40.0, 20.0, 3)),
    ("Southern Europe", view(50.0, 0.0, 3)),
    ("Southwest Europe", view(50.0, -10.0, 3)),
    ("West Africa", view(20.0, 0.0, 3)),
    ("West Asia (Middle East or Near East)", view(30.0, 70.0, 3)),
    ("Western Europe", view(50.0, 0.0, 3)),
    ("Oceania", view(-10.0, 130.0, 2)),
];

const fn view(lat: f64, lon: f64, zoom: u8) -> MapView {
    MapView { lat, lon, zoom }
}

/// Framing for a region name. Unknown names fall back to the world view.
pub fn region_view(name: &str) -> MapView {
    REGIONS
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| *v)
        .unwrap_or_else(|| {
            log::warn!("No map framing for region '{name}', showing the world");
            MapView::WORLD
        })
}

/// Backdrop style for the map panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MapStyle {
    Light,
    #[default]
    Dark,
    Satellite,
    Custom,
}

impl MapStyle {
    pub const ALL: [MapStyle; 4] = [
        MapStyle::Light,
        MapStyle::Dark,
        MapStyle::Satellite,
        MapStyle::Custom,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MapStyle::Light => "Light",
            MapStyle::Dark => "Dark",
            MapStyle::Satellite => "Satellite",
            MapStyle::Custom => "Custom",
        }
    }
}

impl FromStr for MapStyle {
    type Err = UnknownFacet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFacet {
                facet: "map style",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for MapStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_bounds_cover_the_globe() {
        assert_eq!(MapView::WORLD.bounds(), ([-180.0, -90.0], [180.0, 90.0]));
    }

    #[test]
    fn zoom_halves_the_span() {
        let (min, max) = region_view("Western Europe").bounds();
        assert_eq!(max[0] - min[0], 45.0);
        assert_eq!(max[1] - min[1], 22.5);
        assert_eq!((min[0] + max[0]) / 2.0, 0.0);
        assert_eq!((min[1] + max[1]) / 2.0, 50.0);
    }

    #[test]
    fn unknown_region_falls_back_to_world() {
        assert_eq!(region_view("Atlantis"), MapView::WORLD);
        assert_eq!(region_view("oceania").zoom, 2);
    }

    #[test]
    fn region_names_are_unique() {
        for (i, (a, _)) in REGIONS.iter().enumerate() {
            assert!(REGIONS[i + 1..].iter().all(|(b, _)| a != b), "{a}");
        }
    }

    #[test]
    fn map_style_parses() {
        assert_eq!("satellite".parse::<MapStyle>(), Ok(MapStyle::Satellite));
        assert!("sepia".parse::<MapStyle>().is_err());
    }
}
