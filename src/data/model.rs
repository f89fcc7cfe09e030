use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Cell – a single raw value read from the source table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell as it comes out of CSV / JSON / Parquet, before
/// it is normalised into a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl Cell {
    /// Guess the type of a textual cell (CSV has no types).
    pub fn guess(s: &str) -> Self {
        let s = s.trim();
        if s.is_empty() {
            return Cell::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return Cell::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return Cell::Float(f);
        }
        if s == "true" || s == "false" {
            return Cell::Bool(s == "true");
        }
        Cell::Text(s.to_string())
    }

    /// A CSV field kept as written. Only a blank field becomes `Null`;
    /// numbers are parsed later by whoever needs a number.
    pub fn field(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Null
        } else {
            Cell::Text(s.to_string())
        }
    }

    /// Interpret the cell as a finite number. Text that does not parse,
    /// booleans, nulls, NaN and infinities all yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        let v = match self {
            Cell::Float(v) => *v,
            Cell::Integer(i) => *i as f64,
            Cell::Text(s) => s.trim().parse::<f64>().ok()?,
            Cell::Bool(_) | Cell::Null => return None,
        };
        v.is_finite().then_some(v)
    }

    /// Interpret the cell as a whole number. Floats are accepted only when
    /// they carry no fractional part (spreadsheets export `2016.0`).
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            Cell::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            Cell::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| Cell::Float(s.parse::<f64>().ok()?).as_i64())
            }
            _ => None,
        }
    }

    /// Textual view of the cell; `None` for nulls and blank text.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Text(s) if s.trim().is_empty() => None,
            Cell::Text(s) => Some(s.trim().to_string()),
            Cell::Integer(i) => Some(i.to_string()),
            Cell::Float(v) => Some(v.to_string()),
            Cell::Bool(b) => Some(b.to_string()),
            Cell::Null => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Text(s) => write!(f, "{s}"),
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Facet enums
// ---------------------------------------------------------------------------

/// Error returned when a facet label does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {facet} '{value}'")]
pub struct UnknownFacet {
    pub facet: &'static str,
    pub value: String,
}

/// How the visitor entered the UK.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum TransportMode {
    Air,
    Sea,
    Tunnel,
}

impl TransportMode {
    pub const ALL: [TransportMode; 3] = [TransportMode::Air, TransportMode::Sea, TransportMode::Tunnel];

    pub fn label(self) -> &'static str {
        match self {
            TransportMode::Air => "Air",
            TransportMode::Sea => "Sea",
            TransportMode::Tunnel => "Tunnel",
        }
    }
}

impl FromStr for TransportMode {
    type Err = UnknownFacet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFacet {
                facet: "mode",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reason for the visit. `Vfr` is "visiting friends or relatives".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Purpose {
    Holiday,
    Business,
    #[serde(rename = "VFR")]
    Vfr,
    Miscellaneous,
}

impl Purpose {
    pub const ALL: [Purpose; 4] = [
        Purpose::Holiday,
        Purpose::Business,
        Purpose::Vfr,
        Purpose::Miscellaneous,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Purpose::Holiday => "Holiday",
            Purpose::Business => "Business",
            Purpose::Vfr => "VFR",
            Purpose::Miscellaneous => "Miscellaneous",
        }
    }
}

impl FromStr for Purpose {
    type Err = UnknownFacet;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFacet {
                facet: "purpose",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the table
// ---------------------------------------------------------------------------

/// One row of the tourism table: a market's visits for one year, mode and
/// purpose. Numeric measures are `None` when the source cell was missing or
/// not a usable number.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub year: i32,
    pub region: String,
    /// Country of residence of the visitors.
    pub market: String,
    /// Actual duration of stay, in nights.
    pub duration: Option<f64>,
    /// Duration of stay as the source labels it (often a band such as
    /// `4-7 nights`). Shown in the table.
    pub stay_band: Option<String>,
    pub mode: TransportMode,
    pub purpose: Purpose,
    /// Duration of stay predicted by the classification model.
    pub predicted_stay: Option<f64>,
    /// Probability of staying 15 or more days, within `[0, 1]`.
    pub probability: Option<f64>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl Record {
    /// Coordinates as `(lon, lat)`, if both are known.
    pub fn position(&self) -> Option<[f64; 2]> {
        Some([self.lon?, self.lat?])
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table with pre-computed facet indices. Built once at
/// startup and never mutated.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// All rows, in file order.
    pub records: Vec<Record>,
    /// Distinct years, ascending.
    pub years: BTreeSet<i32>,
    /// Distinct regions, sorted.
    pub regions: BTreeSet<String>,
    /// Distinct markets in order of first appearance.
    pub markets: Vec<String>,
}

impl Dataset {
    /// Build facet indices from the loaded rows.
    pub fn from_records(records: Vec<Record>) -> Self {
        let mut years = BTreeSet::new();
        let mut regions = BTreeSet::new();
        let mut seen = BTreeSet::new();
        let mut markets = Vec::new();

        for rec in &records {
            years.insert(rec.year);
            regions.insert(rec.region.clone());
            if seen.insert(rec.market.as_str()) {
                markets.push(rec.market.clone());
            }
        }

        Dataset {
            records,
            years,
            regions,
            markets,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Market used for the hover-linked views before any hover happened:
    /// the first row's market.
    pub fn default_market(&self) -> Option<&str> {
        self.records.first().map(|r| r.market.as_str())
    }

    /// Smallest and largest year, if any rows exist.
    pub fn year_range(&self) -> Option<(i32, i32)> {
        Some((*self.years.first()?, *self.years.last()?))
    }

    /// The dataset year closest to `year`; the earlier one on a tie.
    pub fn nearest_year(&self, year: i32) -> Option<i32> {
        self.years
            .iter()
            .copied()
            .min_by_key(|y| (y.abs_diff(year), *y))
    }
}
