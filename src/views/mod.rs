//! View renderers: pure functions from the dataset and the current
//! [`Selection`](crate::selection::Selection) to renderer-ready view models.
//!
//! Every renderer filters the dataset itself; none shares a cached subset
//! with another. An empty subset yields an empty view model.

pub mod geo;
pub mod series;
pub mod table;

/// Display form of an optional measure.
pub fn fmt_measure(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v}"),
        None => "n/a".to_string(),
    }
}
