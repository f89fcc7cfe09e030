use crate::data::filter::{Criteria, filter};
use crate::data::model::{Dataset, Record};
use crate::selection::Selection;

// ---------------------------------------------------------------------------
// Box statistics
// ---------------------------------------------------------------------------

/// Five-number summary of one group plus the points beyond the whiskers.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub lower_whisker: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub upper_whisker: f64,
    pub outliers: Vec<f64>,
}

/// Quartiles use linear interpolation between closest ranks. Whiskers reach
/// the most extreme values within 1.5 × IQR of the box. `None` when there
/// are no values.
pub fn box_stats(values: &[f64]) -> Option<BoxStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let q1 = quantile(&sorted, 0.25);
    let median = quantile(&sorted, 0.5);
    let q3 = quantile(&sorted, 0.75);
    let fence = 1.5 * (q3 - q1);
    let (lo, hi) = (q1 - fence, q3 + fence);

    let (inside, outliers): (Vec<f64>, Vec<f64>) =
        sorted.iter().partition(|v| (lo..=hi).contains(*v));
    Some(BoxStats {
        lower_whisker: inside.first().copied().unwrap_or(q1),
        q1,
        median,
        q3,
        upper_whisker: inside.last().copied().unwrap_or(q3),
        outliers,
    })
}

fn quantile(sorted: &[f64], p: f64) -> f64 {
    let pos = p * (sorted.len() - 1) as f64;
    let below = pos.floor() as usize;
    let above = pos.ceil() as usize;
    sorted[below] + (sorted[above] - sorted[below]) * (pos - below as f64)
}

// ---------------------------------------------------------------------------
// Box-plot chart
// ---------------------------------------------------------------------------

/// One box at position `x`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxGroup {
    pub x: f64,
    pub count: usize,
    pub stats: BoxStats,
}

/// A titled series of boxes, ordered by `x`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BoxChart {
    pub title: String,
    pub x_label: &'static str,
    pub groups: Vec<BoxGroup>,
}

impl BoxChart {
    /// Number of underlying data points across all boxes.
    pub fn point_count(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Group `(x, y)` points by exact `x` and summarise each group's `y`.
fn group_by_x(mut points: Vec<(f64, f64)>) -> Vec<BoxGroup> {
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    points
        .chunk_by(|a, b| a.0 == b.0)
        .filter_map(|chunk| {
            let ys: Vec<f64> = chunk.iter().map(|(_, y)| *y).collect();
            Some(BoxGroup {
                x: chunk[0].0,
                count: ys.len(),
                stats: box_stats(&ys)?,
            })
        })
        .collect()
}

/// Distribution of the 15+ day probability per year for the hovered market.
pub fn render_year_series(dataset: &Dataset, selection: &Selection) -> BoxChart {
    let market = selection.hover_identity(dataset);
    let points = series_points(dataset, selection, |rec| Some(f64::from(rec.year)));
    BoxChart {
        title: market
            .map(|m| format!("{m}\n{}", selection.region))
            .unwrap_or_default(),
        x_label: "Year",
        groups: group_by_x(points),
    }
}

/// Distribution of the 15+ day probability per duration of stay for the
/// hovered market. Rows without a duration are skipped.
pub fn render_duration_series(dataset: &Dataset, selection: &Selection) -> BoxChart {
    let market = selection.hover_identity(dataset);
    let points = series_points(dataset, selection, |rec| rec.duration);
    BoxChart {
        title: market
            .map(|m| format!("{m}\n{}", selection.year))
            .unwrap_or_default(),
        x_label: "Duration of stay",
        groups: group_by_x(points),
    }
}

/// `(x, probability)` for the hover identity's rows under the selected mode
/// and purpose. Rows lacking either value are skipped.
fn series_points(
    dataset: &Dataset,
    selection: &Selection,
    x: impl Fn(&Record) -> Option<f64>,
) -> Vec<(f64, f64)> {
    let Some(market) = selection.hover_identity(dataset) else {
        return Vec::new();
    };
    let criteria = Criteria::default()
        .market(market)
        .mode(selection.mode)
        .purpose(selection.purpose);
    filter(dataset, &criteria)
        .into_iter()
        .filter_map(|rec| Some((x(rec)?, rec.probability?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{Purpose, TransportMode};
    use crate::regions::MapStyle;
    use crate::selection::ControlEvent;
    use crate::testutil::sample_dataset;

    fn selection() -> Selection {
        Selection::new(
            MapStyle::Dark,
            "Western Europe",
            2016,
            TransportMode::Air,
            Purpose::Holiday,
        )
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let s = box_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.q1, 1.75);
        assert_eq!(s.median, 2.5);
        assert_eq!(s.q3, 3.25);
        assert_eq!((s.lower_whisker, s.upper_whisker), (1.0, 4.0));
        assert!(s.outliers.is_empty());
    }

    #[test]
    fn far_points_become_outliers() {
        let s = box_stats(&[1.0, 2.0, 2.0, 3.0, 40.0]).unwrap();
        assert_eq!(s.outliers, vec![40.0]);
        assert_eq!(s.upper_whisker, 3.0);
    }

    #[test]
    fn single_value_box_collapses() {
        let s = box_stats(&[0.42]).unwrap();
        assert_eq!((s.lower_whisker, s.q1, s.median, s.q3, s.upper_whisker), (0.42, 0.42, 0.42, 0.42, 0.42));
        assert!(box_stats(&[]).is_none());
    }

    #[test]
    fn year_series_defaults_to_first_market() {
        let ds = sample_dataset();
        let chart = render_year_series(&ds, &selection());
        assert_eq!(chart.title, "Germany\nWestern Europe");
        // Germany Air/Holiday: 2016 once, 2017 twice.
        let xs: Vec<f64> = chart.groups.iter().map(|g| g.x).collect();
        assert_eq!(xs, vec![2016.0, 2017.0]);
        assert_eq!(chart.groups[1].count, 2);
        assert_eq!(chart.point_count(), 3);
    }

    #[test]
    fn duration_series_follows_hover() {
        let ds = sample_dataset();
        let sel = selection()
            .apply(&ControlEvent::MapHover("France".into()))
            .apply(&ControlEvent::Mode(TransportMode::Tunnel))
            .apply(&ControlEvent::Purpose(Purpose::Vfr));
        let chart = render_duration_series(&ds, &sel);
        assert_eq!(chart.title, "France\n2016");
        assert_eq!(chart.groups.len(), 1);
        assert_eq!(chart.groups[0].x, 16.0);
        assert_eq!(chart.groups[0].stats.median, 0.71);
    }

    #[test]
    fn both_series_see_the_same_rows() {
        let ds = sample_dataset();
        let sel = selection().apply(&ControlEvent::MapHover("Germany".into()));
        assert_eq!(
            render_year_series(&ds, &sel).point_count(),
            render_duration_series(&ds, &sel).point_count()
        );
    }

    #[test]
    fn missing_values_are_skipped() {
        let mut ds = sample_dataset();
        ds.records[0].probability = None;
        ds.records[1].duration = None;
        let ds = Dataset::from_records(ds.records);
        assert_eq!(render_year_series(&ds, &selection()).point_count(), 2);
        assert_eq!(render_duration_series(&ds, &selection()).point_count(), 1);
    }

    #[test]
    fn unmatched_hover_gives_empty_charts() {
        let ds = sample_dataset();
        let sel = selection().apply(&ControlEvent::MapHover("Atlantis".into()));
        let year = render_year_series(&ds, &sel);
        let duration = render_duration_series(&ds, &sel);
        assert!(year.is_empty() && duration.is_empty());
        assert_eq!(year.point_count() + duration.point_count(), 0);
        assert_eq!(year.title, "Atlantis\nWestern Europe");
    }

    #[test]
    fn empty_dataset_gives_untitled_empty_chart() {
        let ds = Dataset::from_records(Vec::new());
        let chart = render_year_series(&ds, &selection());
        assert!(chart.is_empty());
        assert!(chart.title.is_empty());
    }
}
