use eframe::egui::Color32;
use palette::{LinSrgb, Mix, Srgb};

use crate::regions::MapStyle;

// ---------------------------------------------------------------------------
// Continuous colour scale
// ---------------------------------------------------------------------------

/// Piecewise-linear colour scale over `[0, 1]`, interpolated in linear RGB.
#[derive(Debug, Clone)]
pub struct ColorScale {
    stops: Vec<(f32, LinSrgb)>,
}

impl ColorScale {
    /// Build a scale from `(position, "#rrggbb")` stops sorted by position.
    /// Malformed hex strings fall back to grey.
    pub fn new(stops: &[(f32, &str)]) -> Self {
        let stops = stops
            .iter()
            .map(|&(pos, hex)| {
                let rgb: Srgb<u8> = hex.parse().unwrap_or(Srgb::new(128, 128, 128));
                (pos, rgb.into_format::<f32>().into_linear())
            })
            .collect();
        ColorScale { stops }
    }

    /// Yellow → dark red, used for the 15+ day probability.
    pub fn magnitude() -> Self {
        Self::new(&[
            (0.0, "#ffffb2"),
            (0.25, "#fecc5c"),
            (0.5, "#fd8d3c"),
            (0.75, "#f03b20"),
            (1.0, "#bd0026"),
        ])
    }

    /// Colour at `t`, clamped into the scale's range.
    pub fn color_at(&self, t: f64) -> Color32 {
        let t = t as f32;
        let lin = match self.stops.as_slice() {
            [] => return Color32::GRAY,
            [(_, only)] => *only,
            [(first_pos, first), ..] if t <= *first_pos => *first,
            stops => {
                let upper = stops.iter().position(|(pos, _)| *pos >= t);
                match upper {
                    None => stops[stops.len() - 1].1,
                    Some(i) => {
                        let (p0, c0) = stops[i - 1];
                        let (p1, c1) = stops[i];
                        let span = p1 - p0;
                        let f = if span > 0.0 { (t - p0) / span } else { 0.0 };
                        if f >= 1.0 { c1 } else { c0.mix(c1, f) }
                    }
                }
            }
        };
        let rgb: Srgb<u8> = Srgb::<f32>::from_linear(lin).into_format();
        Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
    }
}

// ---------------------------------------------------------------------------
// Map backdrop
// ---------------------------------------------------------------------------

/// Fill colour behind the markers for each map style.
pub fn backdrop(style: MapStyle) -> Color32 {
    match style {
        MapStyle::Light => Color32::from_rgb(0xf2, 0xef, 0xe9),
        MapStyle::Dark => Color32::from_rgb(0x19, 0x1a, 0x1a),
        MapStyle::Satellite => Color32::from_rgb(0x1d, 0x3b, 0x2a),
        MapStyle::Custom => Color32::from_rgb(0x78, 0x78, 0x78),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hit_the_stops() {
        let scale = ColorScale::magnitude();
        assert_eq!(scale.color_at(0.0), Color32::from_rgb(0xff, 0xff, 0xb2));
        assert_eq!(scale.color_at(1.0), Color32::from_rgb(0xbd, 0x00, 0x26));
        assert_eq!(scale.color_at(0.5), Color32::from_rgb(0xfd, 0x8d, 0x3c));
    }

    #[test]
    fn out_of_range_is_clamped() {
        let scale = ColorScale::magnitude();
        assert_eq!(scale.color_at(-3.0), scale.color_at(0.0));
        assert_eq!(scale.color_at(7.0), scale.color_at(1.0));
    }

    #[test]
    fn midpoints_lie_between_neighbours() {
        let scale = ColorScale::magnitude();
        let c = scale.color_at(0.125);
        assert!(c.r() >= 0xfe);
        assert!(c.g() < 0xff && c.g() > 0xcc);
        assert!(c.b() < 0xb2 && c.b() > 0x5c);
    }
}
