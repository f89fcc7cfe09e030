use std::cmp::Ordering;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::filter::{Criteria, filter};
use crate::data::model::{Dataset, Purpose, Record, TransportMode};
use crate::selection::Selection;
use crate::views::fmt_measure;

/// One display row. Serialized names match the source column headers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRow {
    pub year: i32,
    pub region: String,
    pub market: String,
    /// Stay as labelled by the source, or the actual nights when the source
    /// has no label.
    #[serde(rename = "dur_stay")]
    pub stay: Option<String>,
    pub mode: TransportMode,
    pub purpose: Purpose,
    #[serde(rename = "predict_stay")]
    pub predicted_stay: Option<f64>,
    #[serde(rename = "15_more_prob")]
    pub probability: Option<f64>,
}

impl From<&Record> for TableRow {
    fn from(rec: &Record) -> Self {
        TableRow {
            year: rec.year,
            region: rec.region.clone(),
            market: rec.market.clone(),
            stay: rec
                .stay_band
                .clone()
                .or_else(|| rec.duration.map(|d| d.to_string())),
            mode: rec.mode,
            purpose: rec.purpose,
            predicted_stay: rec.predicted_stay,
            probability: rec.probability,
        }
    }
}

/// Table columns in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Year,
    Region,
    Market,
    Duration,
    Mode,
    Purpose,
    PredictedStay,
    Probability,
}

impl Column {
    pub const ALL: [Column; 8] = [
        Column::Year,
        Column::Region,
        Column::Market,
        Column::Duration,
        Column::Mode,
        Column::Purpose,
        Column::PredictedStay,
        Column::Probability,
    ];

    pub fn header(self) -> &'static str {
        match self {
            Column::Year => "year",
            Column::Region => "region",
            Column::Market => "market",
            Column::Duration => "dur_stay",
            Column::Mode => "mode",
            Column::Purpose => "purpose",
            Column::PredictedStay => "predict_stay",
            Column::Probability => "15_more_prob",
        }
    }
}

impl TableRow {
    /// Display text of one cell.
    pub fn cell(&self, column: Column) -> String {
        match column {
            Column::Year => self.year.to_string(),
            Column::Region => self.region.clone(),
            Column::Market => self.market.clone(),
            Column::Duration => self.stay.clone().unwrap_or_else(|| fmt_measure(None)),
            Column::Mode => self.mode.to_string(),
            Column::Purpose => self.purpose.to_string(),
            Column::PredictedStay => fmt_measure(self.predicted_stay),
            Column::Probability => fmt_measure(self.probability),
        }
    }
}

/// Rows of the hovered market in the selected year, in dataset order.
pub fn render_table(dataset: &Dataset, selection: &Selection) -> Vec<TableRow> {
    let Some(market) = selection.hover_identity(dataset) else {
        return Vec::new();
    };
    let criteria = Criteria::default().market(market).year(selection.year);
    filter(dataset, &criteria).into_iter().map(TableRow::from).collect()
}

/// Keep the rows whose cell text contains every non-blank filter, ignoring
/// case. Row order is unchanged.
pub fn filter_rows(rows: &[TableRow], filters: &[(Column, String)]) -> Vec<TableRow> {
    let needles: Vec<(Column, String)> = filters
        .iter()
        .filter(|(_, text)| !text.trim().is_empty())
        .map(|(column, text)| (*column, text.trim().to_lowercase()))
        .collect();
    rows.iter()
        .filter(|row| {
            needles
                .iter()
                .all(|(column, needle)| row.cell(*column).to_lowercase().contains(needle.as_str()))
        })
        .cloned()
        .collect()
}

/// Stays sort by their leading number (`15+ nights` after `4-7 nights`),
/// then by text.
fn compare_stay(a: &String, b: &String) -> Ordering {
    fn leading(s: &str) -> f64 {
        let end = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        s[..end].parse().unwrap_or(f64::INFINITY)
    }
    leading(a).total_cmp(&leading(b)).then_with(|| a.cmp(b))
}

/// Stable sort of already-rendered rows. Missing values sort last in
/// either direction.
pub fn sort_rows(rows: &mut [TableRow], column: Column, ascending: bool) {
    fn missing_last<T>(
        a: Option<&T>,
        b: Option<&T>,
        ascending: bool,
        cmp: impl Fn(&T, &T) -> Ordering,
    ) -> Ordering {
        match (a, b) {
            (Some(a), Some(b)) if ascending => cmp(a, b),
            (Some(a), Some(b)) => cmp(b, a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
    let num = |a: &f64, b: &f64| a.total_cmp(b);

    rows.sort_by(|a, b| {
        let ord = match column {
            Column::Year => a.year.cmp(&b.year),
            Column::Region => a.region.cmp(&b.region),
            Column::Market => a.market.cmp(&b.market),
            Column::Mode => a.mode.cmp(&b.mode),
            Column::Purpose => a.purpose.cmp(&b.purpose),
            Column::Duration => {
                return missing_last(a.stay.as_ref(), b.stay.as_ref(), ascending, compare_stay);
            }
            Column::PredictedStay => {
                return missing_last(
                    a.predicted_stay.as_ref(),
                    b.predicted_stay.as_ref(),
                    ascending,
                    num,
                );
            }
            Column::Probability => {
                return missing_last(a.probability.as_ref(), b.probability.as_ref(), ascending, num);
            }
        };
        if ascending { ord } else { ord.reverse() }
    });
}

/// Rows as CSV text with a header line, for the clipboard.
pub fn to_csv(rows: &[TableRow]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if rows.is_empty() {
        writer
            .write_record(Column::ALL.map(Column::header))
            .context("writing CSV header")?;
    }
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    let bytes = writer.into_inner().context("flushing CSV")?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::MapStyle;
    use crate::selection::ControlEvent;
    use crate::testutil::{france_dataset, sample_dataset};

    fn selection(year: i32) -> Selection {
        Selection::new(
            MapStyle::Dark,
            "Western Europe",
            year,
            TransportMode::Air,
            Purpose::Holiday,
        )
    }

    #[test]
    fn hovered_france_in_2016_shows_exactly_that_row() {
        let ds = france_dataset();
        let sel = selection(2016).apply(&ControlEvent::MapHover("France".into()));
        let rows = render_table(&ds, &sel);
        assert_eq!(rows, vec![TableRow::from(&ds.records[0])]);
        assert_eq!(rows[0].probability, Some(0.42));
    }

    #[test]
    fn table_ignores_mode_and_purpose() {
        let ds = sample_dataset();
        let sel = selection(2016).apply(&ControlEvent::MapHover("France".into()));
        let rows = render_table(&ds, &sel);
        // France 2016: Air/Holiday and Tunnel/VFR.
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].mode, TransportMode::Tunnel);
    }

    #[test]
    fn default_identity_and_empty_year() {
        let ds = sample_dataset();
        assert!(render_table(&ds, &selection(2016)).iter().all(|r| r.market == "Germany"));
        assert!(render_table(&ds, &selection(1990)).is_empty());
    }

    #[test]
    fn sorting_puts_missing_last() {
        let ds = sample_dataset();
        let mut rows: Vec<TableRow> = ds.records.iter().map(TableRow::from).collect();
        rows[2].probability = None;

        sort_rows(&mut rows, Column::Probability, false);
        assert_eq!(rows[0].probability, Some(0.71));
        assert_eq!(rows.last().unwrap().probability, None);

        sort_rows(&mut rows, Column::Probability, true);
        assert_eq!(rows[0].probability, Some(0.08));
        assert_eq!(rows.last().unwrap().probability, None);

        sort_rows(&mut rows, Column::Market, true);
        assert_eq!(rows[0].market, "France");
        assert_eq!(rows.last().unwrap().market, "USA");
    }

    #[test]
    fn stay_sorts_by_leading_number() {
        let ds = sample_dataset();
        let mut rows: Vec<TableRow> = ds.records.iter().map(TableRow::from).collect();
        rows[0].stay = None;

        sort_rows(&mut rows, Column::Duration, true);
        assert_eq!(rows[0].stay.as_deref(), Some("1-3 nights"));
        assert_eq!(rows[rows.len() - 2].stay.as_deref(), Some("15+ nights"));
        assert_eq!(rows.last().unwrap().stay, None);
    }

    #[test]
    fn stay_falls_back_to_actual_nights() {
        let mut rec = france_dataset().records[0].clone();
        rec.stay_band = None;
        assert_eq!(TableRow::from(&rec).stay.as_deref(), Some("4"));
        rec.duration = None;
        assert_eq!(TableRow::from(&rec).cell(Column::Duration), "n/a");
    }

    #[test]
    fn column_filters_match_substrings_and_combine() {
        let ds = sample_dataset();
        let rows: Vec<TableRow> = ds.records.iter().map(TableRow::from).collect();

        let germany = filter_rows(&rows, &[(Column::Market, "GER".to_string())]);
        assert_eq!(germany.len(), 4);
        assert!(germany.iter().all(|r| r.market == "Germany"));

        let narrowed = filter_rows(
            &rows,
            &[
                (Column::Market, "ger".to_string()),
                (Column::Year, "2017".to_string()),
                (Column::Region, "  ".to_string()),
            ],
        );
        assert_eq!(narrowed.len(), 2);
        assert!(narrowed.iter().all(|r| r.year == 2017));

        let mut missing = rows.clone();
        missing[5].probability = None;
        let na = filter_rows(&missing, &[(Column::Probability, "n/a".to_string())]);
        assert_eq!(na, vec![missing[5].clone()]);

        assert_eq!(filter_rows(&rows, &[]), rows);
        assert!(filter_rows(&rows, &[(Column::Mode, "rail".to_string())]).is_empty());
    }

    #[test]
    fn csv_export_uses_source_headers() {
        let ds = france_dataset();
        let rows: Vec<TableRow> = ds.records.iter().map(TableRow::from).collect();
        let text = to_csv(&rows).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("year,region,market,dur_stay,mode,purpose,predict_stay,15_more_prob")
        );
        assert_eq!(
            lines.next(),
            Some("2016,Western Europe,France,4-7 nights,Air,Holiday,3.5,0.42")
        );
    }

    #[test]
    fn csv_export_of_nothing_is_just_a_header() {
        assert_eq!(
            to_csv(&[]).unwrap(),
            "year,region,market,dur_stay,mode,purpose,predict_stay,15_more_prob\n"
        );
    }
}
