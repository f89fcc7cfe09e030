use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::ArrowWriter;

/// Write a deterministic synthetic tourism table for trying the dashboard
/// without the survey extract.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Output file; `.csv` writes CSV, anything else Parquet.
    #[arg(default_value = "london_tourism.parquet")]
    output: PathBuf,

    /// PRNG seed.
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// (market, region, lat, lon, distance factor in 0..1)
const MARKETS: &[(&str, &str, f64, f64, f64)] = &[
    ("France", "Western Europe", 46.2, 2.2, 0.05),
    ("Germany", "Western Europe", 51.2, 10.4, 0.1),
    ("Netherlands", "Western Europe", 52.1, 5.3, 0.05),
    ("Belgium", "Western Europe", 50.5, 4.5, 0.05),
    ("Irish Republic", "Western Europe", 53.4, -8.2, 0.05),
    ("Spain", "Southwest Europe", 40.5, -3.7, 0.15),
    ("Italy", "Southern Europe", 41.9, 12.6, 0.15),
    ("Portugal", "Southwest Europe", 39.4, -8.2, 0.15),
    ("Greece", "Southeast Europe", 39.1, 21.8, 0.2),
    ("Sweden", "Northern Europe", 60.1, 18.6, 0.15),
    ("Norway", "Northern Europe", 60.5, 8.5, 0.15),
    ("Poland", "Eastern Europe", 51.9, 19.1, 0.2),
    ("Romania", "Southeast Europe", 45.9, 25.0, 0.25),
    ("USA", "North America", 37.1, -95.7, 0.6),
    ("Canada", "North America", 56.1, -106.3, 0.6),
    ("Brazil", "Central America & South America", -14.2, -51.9, 0.7),
    ("India", "South Asia", 20.6, 79.0, 0.8),
    ("China", "North & Central Asia", 35.9, 104.2, 0.8),
    ("Japan", "North & Central Asia", 36.2, 138.3, 0.8),
    ("Australia", "Oceania", -25.3, 133.8, 1.0),
    ("Nigeria", "West Africa", 9.1, 8.7, 0.6),
    ("Egypt", "North Africa", 26.8, 30.8, 0.45),
    ("United Arab Emirates", "West Asia (Middle East or Near East)", 23.4, 53.8, 0.5),
];

const MODES: [&str; 3] = ["Air", "Sea", "Tunnel"];
/// (purpose, baseline probability of a 15+ day stay)
const PURPOSES: [(&str, f64); 4] = [
    ("Holiday", 0.15),
    ("Business", 0.08),
    ("VFR", 0.35),
    ("Miscellaneous", 0.25),
];
const YEARS: std::ops::RangeInclusive<i32> = 2010..=2017;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

#[derive(Default)]
struct Columns {
    year: Vec<i32>,
    region: Vec<&'static str>,
    market: Vec<&'static str>,
    dur_stay: Vec<&'static str>,
    actual_dur_stay: Vec<f64>,
    mode: Vec<&'static str>,
    purpose: Vec<&'static str>,
    predict_stay: Vec<f64>,
    probability: Vec<Option<f64>>,
    lat: Vec<f64>,
    lon: Vec<f64>,
}

impl Columns {
    fn len(&self) -> usize {
        self.year.len()
    }
}

fn generate(rng: &mut SimpleRng) -> Columns {
    let mut cols = Columns::default();
    for year in YEARS {
        let trend = f64::from(year - YEARS.start()) * 0.004;
        for &(market, region, lat, lon, distance) in MARKETS {
            for mode in MODES {
                // Long-haul markets rarely arrive by sea or through the tunnel.
                if mode != "Air" && distance > 0.3 && rng.next_f64() < 0.9 {
                    continue;
                }
                for (purpose, base) in PURPOSES {
                    let visits = 1 + (rng.next_f64() * 4.0) as usize;
                    for _ in 0..visits {
                        let p = (base + 0.3 * distance + trend + rng.gauss(0.0, 0.08)).clamp(0.0, 1.0);
                        let dur = (2.0 + 25.0 * p + rng.gauss(0.0, 2.0)).max(1.0).round();
                        let predicted = (dur + rng.gauss(0.0, 1.5)).max(0.5);

                        cols.year.push(year);
                        cols.region.push(region);
                        cols.market.push(market);
                        cols.dur_stay.push(stay_band(dur));
                        cols.actual_dur_stay.push(dur);
                        cols.mode.push(mode);
                        cols.purpose.push(purpose);
                        cols.predict_stay.push((predicted * 100.0).round() / 100.0);
                        // A small share of rows carries no estimate.
                        cols.probability
                            .push((rng.next_f64() > 0.01).then_some((p * 1000.0).round() / 1000.0));
                        cols.lat.push(lat);
                        cols.lon.push(lon);
                    }
                }
            }
        }
    }
    cols
}

/// Survey-style label for a number of nights.
fn stay_band(nights: f64) -> &'static str {
    match nights {
        n if n < 4.0 => "1-3 nights",
        n if n < 8.0 => "4-7 nights",
        n if n < 15.0 => "8-14 nights",
        _ => "15+ nights",
    }
}

fn to_batch(cols: Columns) -> Result<RecordBatch> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("year", DataType::Int32, false),
        Field::new("region", DataType::Utf8, false),
        Field::new("market", DataType::Utf8, false),
        Field::new("dur_stay", DataType::Utf8, false),
        Field::new("actual_dur_stay", DataType::Float64, false),
        Field::new("mode", DataType::Utf8, false),
        Field::new("purpose", DataType::Utf8, false),
        Field::new("predict_stay", DataType::Float64, false),
        Field::new("15_more_prob", DataType::Float64, true),
        Field::new("lat", DataType::Float64, false),
        Field::new("lon", DataType::Float64, false),
    ]));

    let arrays: Vec<ArrayRef> = vec![
        Arc::new(Int32Array::from(cols.year)),
        Arc::new(StringArray::from(cols.region)),
        Arc::new(StringArray::from(cols.market)),
        Arc::new(StringArray::from(cols.dur_stay)),
        Arc::new(Float64Array::from(cols.actual_dur_stay)),
        Arc::new(StringArray::from(cols.mode)),
        Arc::new(StringArray::from(cols.purpose)),
        Arc::new(Float64Array::from(cols.predict_stay)),
        Arc::new(Float64Array::from(cols.probability)),
        Arc::new(Float64Array::from(cols.lat)),
        Arc::new(Float64Array::from(cols.lon)),
    ];
    RecordBatch::try_new(schema, arrays).context("building record batch")
}

fn write_parquet(path: &Path, batch: &RecordBatch) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(batch)?;
    writer.close()?;
    Ok(())
}

fn write_csv(path: &Path, cols: &Columns) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    wtr.write_record([
        "year",
        "region",
        "market",
        "dur_stay",
        "actual_dur_stay",
        "mode",
        "purpose",
        "predict_stay",
        "15_more_prob",
        "lat",
        "lon",
    ])?;
    for i in 0..cols.len() {
        wtr.write_record([
            cols.year[i].to_string(),
            cols.region[i].to_owned(),
            cols.market[i].to_owned(),
            cols.dur_stay[i].to_owned(),
            cols.actual_dur_stay[i].to_string(),
            cols.mode[i].to_owned(),
            cols.purpose[i].to_owned(),
            cols.predict_stay[i].to_string(),
            cols.probability[i].map(|p| p.to_string()).unwrap_or_default(),
            cols.lat[i].to_string(),
            cols.lon[i].to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let cols = generate(&mut rng);
    let rows = cols.len();
    if rows == 0 {
        bail!("generator produced no rows");
    }

    let is_csv = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if is_csv {
        write_csv(&args.output, &cols)?;
    } else {
        write_parquet(&args.output, &to_batch(cols)?)?;
    }

    println!(
        "Wrote {rows} rows ({} markets, {}-{}) to {}",
        MARKETS.len(),
        YEARS.start(),
        YEARS.end(),
        args.output.display()
    );
    Ok(())
}
