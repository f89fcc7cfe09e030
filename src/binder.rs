use crate::data::model::Dataset;
use crate::selection::{ControlEvent, Selection};
use crate::views::geo::{GeoView, render_geo};
use crate::views::series::{BoxChart, render_duration_series, render_year_series};
use crate::views::table::{TableRow, render_table};

// ---------------------------------------------------------------------------
// Controls, views and the static dependency table
// ---------------------------------------------------------------------------

/// An independent event source in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    MapStyle,
    Region,
    Year,
    Mode,
    Purpose,
    MapHover,
}

impl Control {
    pub const ALL: [Control; 6] = [
        Control::MapStyle,
        Control::Region,
        Control::Year,
        Control::Mode,
        Control::Purpose,
        Control::MapHover,
    ];
}

/// A display element fed by one renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Geo,
    YearSeries,
    DurationSeries,
    Table,
}

impl View {
    pub const ALL: [View; 4] = [View::Geo, View::YearSeries, View::DurationSeries, View::Table];
}

impl ControlEvent {
    /// The control that emitted this event.
    pub fn control(&self) -> Control {
        match self {
            ControlEvent::MapStyle(_) => Control::MapStyle,
            ControlEvent::Region(_) => Control::Region,
            ControlEvent::Year(_) => Control::Year,
            ControlEvent::Mode(_) => Control::Mode,
            ControlEvent::Purpose(_) => Control::Purpose,
            ControlEvent::MapHover(_) => Control::MapHover,
        }
    }
}

/// Which views recompute when each control changes.
pub const BINDINGS: &[(Control, &[View])] = &[
    (Control::MapStyle, &[View::Geo]),
    (Control::Region, &[View::Geo, View::YearSeries]),
    (Control::Year, &[View::Geo, View::DurationSeries, View::Table]),
    (Control::Mode, &[View::Geo, View::YearSeries, View::DurationSeries]),
    (Control::Purpose, &[View::Geo, View::YearSeries, View::DurationSeries]),
    (Control::MapHover, &[View::YearSeries, View::DurationSeries, View::Table]),
];

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum BindingError {
    #[error("control {0:?} has no binding")]
    UnboundControl(Control),
    #[error("control {0:?} is bound more than once")]
    DuplicateControl(Control),
    #[error("view {0:?} does not depend on any control")]
    OrphanView(View),
}

/// Check that every control is bound exactly once and every view is fed by
/// at least one control.
pub fn validate_bindings(bindings: &[(Control, &[View])]) -> Result<(), BindingError> {
    for control in Control::ALL {
        match bindings.iter().filter(|(c, _)| *c == control).count() {
            0 => return Err(BindingError::UnboundControl(control)),
            1 => {}
            _ => return Err(BindingError::DuplicateControl(control)),
        }
    }
    for view in View::ALL {
        if !bindings.iter().any(|(_, views)| views.contains(&view)) {
            return Err(BindingError::OrphanView(view));
        }
    }
    Ok(())
}

/// Views depending on `control` in [`BINDINGS`].
pub fn dependents(control: Control) -> &'static [View] {
    BINDINGS
        .iter()
        .find(|(c, _)| *c == control)
        .map(|(_, views)| *views)
        .unwrap_or(&[])
}

// ---------------------------------------------------------------------------
// Dashboard: selection plus the current view models
// ---------------------------------------------------------------------------

/// The binder's only state: the read-only dataset, the current selection
/// and the last output of each renderer.
pub struct Dashboard {
    dataset: Dataset,
    selection: Selection,
    marker_scale: f64,
    pub geo: GeoView,
    pub year_series: BoxChart,
    pub duration_series: BoxChart,
    pub table: Vec<TableRow>,
}

impl Dashboard {
    /// Validate the binding table and render every view once.
    pub fn new(dataset: Dataset, selection: Selection, marker_scale: f64) -> Result<Self, BindingError> {
        validate_bindings(BINDINGS)?;
        let geo = render_geo(&dataset, &selection, marker_scale);
        let year_series = render_year_series(&dataset, &selection);
        let duration_series = render_duration_series(&dataset, &selection);
        let table = render_table(&dataset, &selection);
        Ok(Dashboard {
            dataset,
            selection,
            marker_scale,
            geo,
            year_series,
            duration_series,
            table,
        })
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Apply one control event: derive the next selection, then recompute
    /// exactly the views bound to that control. Returns the refreshed views.
    pub fn apply(&mut self, event: ControlEvent) -> &'static [View] {
        let control = event.control();
        self.selection = self.selection.apply(&event);
        let views = dependents(control);
        for view in views {
            self.refresh(*view);
        }
        log::debug!("{event:?} refreshed {views:?}");
        views
    }

    fn refresh(&mut self, view: View) {
        let (ds, sel) = (&self.dataset, &self.selection);
        match view {
            View::Geo => self.geo = render_geo(ds, sel, self.marker_scale),
            View::YearSeries => self.year_series = render_year_series(ds, sel),
            View::DurationSeries => self.duration_series = render_duration_series(ds, sel),
            View::Table => self.table = render_table(ds, sel),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Purpose, TransportMode};
    use crate::regions::MapStyle;
    use crate::testutil::{france_dataset, sample_dataset};
    use crate::views::geo::DEFAULT_MARKER_SCALE;

    fn dashboard(dataset: Dataset) -> Dashboard {
        let sel = Selection::new(
            MapStyle::Dark,
            "Western Europe",
            2016,
            TransportMode::Air,
            Purpose::Holiday,
        );
        Dashboard::new(dataset, sel, DEFAULT_MARKER_SCALE).unwrap()
    }

    #[test]
    fn shipped_bindings_are_complete() {
        assert_eq!(validate_bindings(BINDINGS), Ok(()));
    }

    #[test]
    fn incomplete_bindings_are_rejected() {
        let missing: &[(Control, &[View])] = &BINDINGS[..5];
        assert_eq!(
            validate_bindings(missing),
            Err(BindingError::UnboundControl(Control::MapHover))
        );

        let mut doubled = BINDINGS.to_vec();
        doubled.push((Control::Year, &[View::Table] as &[View]));
        assert_eq!(
            validate_bindings(&doubled),
            Err(BindingError::DuplicateControl(Control::Year))
        );

        const CHARTS: &[View] = &[View::Geo, View::YearSeries, View::DurationSeries];
        let no_table: Vec<(Control, &[View])> = Control::ALL.iter().map(|c| (*c, CHARTS)).collect();
        assert_eq!(
            validate_bindings(&no_table),
            Err(BindingError::OrphanView(View::Table))
        );
    }

    #[test]
    fn france_scenario() {
        let mut dash = dashboard(france_dataset());
        assert_eq!(dash.geo.markers.len(), 1);
        assert_eq!(dash.geo.markers[0].size, 0.42 * DEFAULT_MARKER_SCALE);

        let refreshed = dash.apply(ControlEvent::MapHover("France".into()));
        assert_eq!(refreshed, &[View::YearSeries, View::DurationSeries, View::Table]);
        assert_eq!(dash.table.len(), 1);
        assert_eq!(dash.table[0].market, "France");
        assert_eq!(dash.table[0].year, 2016);
    }

    #[test]
    fn only_bound_views_recompute() {
        let mut dash = dashboard(sample_dataset());
        let table_before = dash.table.clone();
        let geo_before = dash.geo.clone();

        // Mode does not feed the table, so it keeps its old rows even
        // though the new selection would render the same ones.
        dash.apply(ControlEvent::Mode(TransportMode::Sea));
        assert_eq!(dash.table, table_before);
        assert_ne!(dash.geo, geo_before);

        // Map style touches only the map.
        let series_before = dash.year_series.clone();
        assert_eq!(dash.apply(ControlEvent::MapStyle(MapStyle::Light)), &[View::Geo]);
        assert_eq!(dash.geo.style, MapStyle::Light);
        assert_eq!(dash.year_series, series_before);
    }

    #[test]
    fn empty_combination_and_restore_is_idempotent() {
        let mut dash = dashboard(sample_dataset());
        let original = dash.geo.clone();
        assert!(!original.markers.is_empty());

        dash.apply(ControlEvent::Mode(TransportMode::Tunnel));
        assert!(dash.geo.markers.is_empty());
        assert!(dash.year_series.is_empty());
        assert!(dash.duration_series.is_empty());

        dash.apply(ControlEvent::Mode(TransportMode::Air));
        assert_eq!(dash.geo, original);
    }

    #[test]
    fn absent_tuple_empties_every_view() {
        let mut dash = dashboard(sample_dataset());
        dash.apply(ControlEvent::Year(1999));
        dash.apply(ControlEvent::Mode(TransportMode::Tunnel));
        dash.apply(ControlEvent::Purpose(Purpose::Business));
        dash.apply(ControlEvent::MapHover("Atlantis".into()));
        assert!(dash.geo.markers.is_empty());
        assert_eq!(dash.year_series.point_count(), 0);
        assert_eq!(dash.duration_series.point_count(), 0);
        assert!(dash.table.is_empty());
    }

    #[test]
    fn side_charts_agree_after_each_event() {
        let mut dash = dashboard(sample_dataset());
        for event in [
            ControlEvent::MapHover("France".into()),
            ControlEvent::Mode(TransportMode::Tunnel),
            ControlEvent::Purpose(Purpose::Vfr),
            ControlEvent::MapHover("Germany".into()),
        ] {
            dash.apply(event);
            assert_eq!(
                dash.year_series.point_count(),
                dash.duration_series.point_count()
            );
        }
    }

    #[test]
    fn last_applied_event_wins() {
        let mut dash = dashboard(sample_dataset());
        dash.apply(ControlEvent::Year(2017));
        dash.apply(ControlEvent::Year(2016));
        assert_eq!(dash.selection().year, 2016);
        assert!(dash.geo.markers.iter().all(|m| m.market != "USA"));
    }
}
