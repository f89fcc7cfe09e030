//! Shared fixtures for unit tests.

use crate::data::model::{Dataset, Purpose, Record, TransportMode};

/// An Air/Holiday row for `market` in `year` with every measure present.
pub fn record(market: &str, year: i32) -> Record {
    Record {
        year,
        region: "Western Europe".to_string(),
        market: market.to_string(),
        duration: Some(4.0),
        stay_band: Some("4-7 nights".to_string()),
        mode: TransportMode::Air,
        purpose: Purpose::Holiday,
        predicted_stay: Some(3.5),
        probability: Some(0.5),
        lat: Some(48.0),
        lon: Some(2.0),
    }
}

pub fn row(
    market: &str,
    year: i32,
    mode: TransportMode,
    purpose: Purpose,
    duration: f64,
    probability: f64,
) -> Record {
    Record {
        mode,
        purpose,
        duration: Some(duration),
        stay_band: Some(band(duration).to_string()),
        probability: Some(probability),
        ..record(market, year)
    }
}

fn band(nights: f64) -> &'static str {
    match nights {
        n if n < 4.0 => "1-3 nights",
        n if n < 8.0 => "4-7 nights",
        n if n < 15.0 => "8-14 nights",
        _ => "15+ nights",
    }
}

/// A small table covering three markets, two years and several
/// mode/purpose combinations. Germany comes first so it is the default
/// hover identity.
pub fn sample_dataset() -> Dataset {
    use Purpose::*;
    use TransportMode::*;

    let mut usa = row("USA", 2016, Air, Business, 9.0, 0.61);
    usa.region = "North America".to_string();
    usa.lat = Some(37.1);
    usa.lon = Some(-95.7);

    Dataset::from_records(vec![
        row("Germany", 2016, Air, Holiday, 3.0, 0.12),
        row("Germany", 2017, Air, Holiday, 4.0, 0.18),
        row("Germany", 2016, Sea, Holiday, 5.0, 0.22),
        row("France", 2016, Air, Holiday, 2.0, 0.08),
        row("France", 2016, Tunnel, Vfr, 16.0, 0.71),
        row("France", 2017, Air, Business, 3.0, 0.10),
        row("Germany", 2017, Air, Holiday, 7.0, 0.35),
        usa,
    ])
}

/// The single-row France/2016/Air/Holiday table with probability 0.42.
pub fn france_dataset() -> Dataset {
    Dataset::from_records(vec![Record {
        lat: Some(46.2),
        lon: Some(2.2),
        ..row("France", 2016, TransportMode::Air, Purpose::Holiday, 4.0, 0.42)
    }])
}
