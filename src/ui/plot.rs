use eframe::egui::{Color32, Stroke, Ui};
use egui_plot::{
    BoxElem, BoxPlot, BoxSpread, MarkerShape, Plot, PlotBounds, PlotPoints, Points, Polygon,
};

use crate::color::backdrop;
use crate::regions::MapView;
use crate::views::geo::{GeoView, nearest_marker};
use crate::views::series::BoxChart;

/// Pointer tolerance for marker hover, in screen pixels.
const HOVER_RADIUS_PX: f64 = 8.0;

// ---------------------------------------------------------------------------
// Geo map (central panel)
// ---------------------------------------------------------------------------

/// Draw the marker map. The plot is re-framed whenever `geo.view` differs
/// from `framed`. Returns the market under the pointer, if any.
pub fn geo_map(ui: &mut Ui, geo: &GeoView, framed: &mut Option<MapView>, height: f32) -> Option<String> {
    let reframe = *framed != Some(geo.view);
    if reframe {
        *framed = Some(geo.view);
    }

    let response = Plot::new("graph_geo")
        .height(height)
        .data_aspect(1.0)
        .x_axis_label("Longitude")
        .y_axis_label("Latitude")
        .show_background(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .label_formatter(|name, _| name.to_owned())
        .show(ui, |plot_ui| {
            if reframe {
                let (min, max) = geo.view.bounds();
                plot_ui.set_plot_bounds(PlotBounds::from_min_max(min, max));
            }

            let world: PlotPoints = vec![[-180.0, -90.0], [180.0, -90.0], [180.0, 90.0], [-180.0, 90.0]].into();
            plot_ui.polygon(
                Polygon::new(world)
                    .fill_color(backdrop(geo.style))
                    .stroke(Stroke::NONE),
            );

            for marker in &geo.markers {
                plot_ui.points(
                    Points::new(vec![[marker.lon, marker.lat]])
                        .name(&marker.label)
                        .shape(MarkerShape::Circle)
                        .filled(true)
                        .radius((marker.size / 2.0) as f32)
                        .color(marker.color),
                );
            }

            let pointer = plot_ui.pointer_coordinate()?;
            let tolerance = HOVER_RADIUS_PX * plot_ui.transform().dvalue_dpos()[0].abs();
            nearest_marker(&geo.markers, [pointer.x, pointer.y], tolerance).map(|m| m.market.clone())
        });

    if geo.markers.is_empty() {
        ui.label("No markers for this year, mode and purpose.");
    }
    response.inner
}

// ---------------------------------------------------------------------------
// Box-plot charts (below the map)
// ---------------------------------------------------------------------------

/// Draw one hover-linked box-plot chart. An empty chart still draws its
/// axes.
pub fn box_chart(ui: &mut Ui, id: &str, chart: &BoxChart, color: Color32, height: f32) {
    if chart.title.is_empty() {
        ui.strong("No market");
    } else {
        ui.strong(format!("{} (n = {})", chart.title.replace('\n', " · "), chart.point_count()));
    }

    let width = box_width(chart);
    let boxes: Vec<BoxElem> = chart
        .groups
        .iter()
        .map(|g| {
            let s = &g.stats;
            BoxElem::new(
                g.x,
                BoxSpread::new(s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker),
            )
            .name(format!("{} = {} (n = {})", chart.x_label, g.x, g.count))
            .box_width(width)
            .whisker_width(width * 0.5)
            .fill(color.gamma_multiply(0.4))
            .stroke(Stroke::new(1.5, color))
        })
        .collect();
    let outliers: Vec<[f64; 2]> = chart
        .groups
        .iter()
        .flat_map(|g| g.stats.outliers.iter().map(move |y| [g.x, *y]))
        .collect();

    Plot::new(id)
        .height(height)
        .x_axis_label(chart.x_label)
        .y_axis_label("P(stay 15+ days)")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            if !boxes.is_empty() {
                plot_ui.box_plot(BoxPlot::new(boxes).color(color));
            }
            if !outliers.is_empty() {
                plot_ui.points(Points::new(outliers).radius(2.5).color(color));
            }
        });

    if chart.is_empty() {
        ui.label("No data for the hovered market with this mode and purpose.");
    }
}

/// Boxes take 60% of the smallest gap between neighbouring x positions.
fn box_width(chart: &BoxChart) -> f64 {
    chart
        .groups
        .windows(2)
        .map(|w| w[1].x - w[0].x)
        .fold(f64::INFINITY, f64::min)
        .min(1.0)
        * 0.6
}
