use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float32Type, Float64Type, Int32Type, Int64Type};
use arrow::util::display::array_value_to_string;
use calamine::{Data, Reader, open_workbook_auto};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{Cell, Dataset, Purpose, Record, TransportMode, UnknownFacet};

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Required columns, each with the header spellings accepted for it in
/// order of preference. The first spelling is the name used in error
/// messages.
const COLUMNS: [&[&str]; 10] = [
    &["year"],
    &["region"],
    &["market", "country"],
    &["actual_dur_stay", "dur_stay"],
    &["mode"],
    &["purpose"],
    &["predict_stay"],
    &["15_more_prob", "probability"],
    &["lat", "latitude"],
    &["lon", "longitude"],
];

/// Optional text column with the stay as labelled by the source.
const STAY_BAND_COLUMN: &str = "dur_stay";

/// Sheet read from spreadsheets; the first sheet is used when absent.
const SPREADSHEET_SHEET: &str = "london_index";

/// Stand-in for cells past the end of a short row.
static NULL_CELL: Cell = Cell::Null;

/// Fatal problems with the input table. Any of these aborts the load.
///
/// `line` counts the header as line 1, so it matches the line of a CSV
/// file or the row number of a spreadsheet.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("line {line}: '{value}' is not a valid year")]
    InvalidYear { line: usize, value: String },
    #[error("line {line}: column '{column}' is empty")]
    EmptyField { line: usize, column: &'static str },
    #[error("line {line}: {source}")]
    UnknownFacet {
        line: usize,
        #[source]
        source: UnknownFacet,
    },
    #[error("dataset contains no rows")]
    NoRows,
}

/// Column positions of the required fields within a raw table.
#[derive(Debug, Clone, Copy)]
struct Schema {
    year: usize,
    region: usize,
    market: usize,
    duration: usize,
    stay_band: Option<usize>,
    mode: usize,
    purpose: usize,
    predicted_stay: usize,
    probability: usize,
    lat: usize,
    lon: usize,
}

impl Schema {
    fn resolve(headers: &[String]) -> Result<Self, SchemaError> {
        let find = |name: &str| headers.iter().position(|h| h.trim().eq_ignore_ascii_case(name));

        let mut idx = [0usize; COLUMNS.len()];
        for (slot, spellings) in idx.iter_mut().zip(COLUMNS) {
            *slot = spellings
                .iter()
                .find_map(|s| find(s))
                .ok_or(SchemaError::MissingColumn(spellings[0]))?;
        }
        let [year, region, market, duration, mode, purpose, predicted_stay, probability, lat, lon] =
            idx;
        Ok(Schema {
            year,
            region,
            market,
            duration,
            stay_band: find(STAY_BAND_COLUMN),
            mode,
            purpose,
            predicted_stay,
            probability,
            lat,
            lon,
        })
    }
}

/// Intermediate, format-independent view of the input: headers plus cells.
#[derive(Debug, Default)]
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the tourism table from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per line
/// * `.json`    – `[{ "year": 2016, "market": "France", ... }, ...]`
/// * `.parquet` – flat columns, as written by Pandas or Polars
/// * `.xlsx`    – the `london_index` sheet (or the first one), header in row 1
pub fn load_file(path: &Path) -> Result<Dataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => read_csv(std::fs::File::open(path).context("opening CSV")?)?,
        "json" => parse_json(&std::fs::read_to_string(path).context("reading JSON file")?)?,
        "parquet" | "pq" => read_parquet(path)?,
        "xlsx" | "xlsm" | "xls" | "ods" => read_spreadsheet(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let dataset = build_dataset(table).with_context(|| format!("loading {}", path.display()))?;
    log::info!(
        "Loaded {} rows ({} markets, {} years, {} regions) from {}",
        dataset.len(),
        dataset.markets.len(),
        dataset.years.len(),
        dataset.regions.len(),
        path.display()
    );
    Ok(dataset)
}

/// Check the schema and convert every row. Any schema error aborts the
/// whole load; numeric measures that are unusable become `None`.
fn build_dataset(table: RawTable) -> Result<Dataset, SchemaError> {
    let schema = Schema::resolve(&table.headers)?;

    let mut normalised = 0usize;
    let records = table
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| to_record(&schema, row, i + 2, &mut normalised))
        .collect::<Result<Vec<_>, _>>()?;

    if records.is_empty() {
        return Err(SchemaError::NoRows);
    }
    if normalised > 0 {
        log::warn!("{normalised} non-numeric or out-of-range measures treated as missing");
    }
    Ok(Dataset::from_records(records))
}

fn to_record(
    schema: &Schema,
    row: &[Cell],
    line: usize,
    normalised: &mut usize,
) -> Result<Record, SchemaError> {
    let cell = |i: usize| row.get(i).unwrap_or(&NULL_CELL);

    let year_cell = cell(schema.year);
    let year = year_cell
        .as_i64()
        .and_then(|y| i32::try_from(y).ok())
        .ok_or_else(|| SchemaError::InvalidYear {
            line,
            value: year_cell.to_string(),
        })?;

    let text = |i: usize, column: &'static str| {
        cell(i)
            .as_text()
            .ok_or(SchemaError::EmptyField { line, column })
    };
    let region = text(schema.region, "region")?;
    let market = text(schema.market, "market")?;
    let mode = text(schema.mode, "mode")?
        .parse::<TransportMode>()
        .map_err(|source| SchemaError::UnknownFacet { line, source })?;
    let purpose = text(schema.purpose, "purpose")?
        .parse::<Purpose>()
        .map_err(|source| SchemaError::UnknownFacet { line, source })?;
    let stay_band = schema.stay_band.and_then(|i| cell(i).as_text());

    // A present-but-unusable value counts as normalised; a blank cell is
    // simply missing.
    let mut measure = |i: usize, valid: fn(f64) -> bool| {
        let c = cell(i);
        let v = c.as_f64().filter(|v| valid(*v));
        if v.is_none() && *c != Cell::Null {
            *normalised += 1;
        }
        v
    };
    let duration = measure(schema.duration, |v| v >= 0.0);
    let predicted_stay = measure(schema.predicted_stay, |v| v >= 0.0);
    let probability = measure(schema.probability, |v| (0.0..=1.0).contains(&v));
    let lat = measure(schema.lat, |v| (-90.0..=90.0).contains(&v));
    let lon = measure(schema.lon, |v| (-180.0..=180.0).contains(&v));

    Ok(Record {
        year,
        region,
        market,
        duration,
        stay_band,
        mode,
        purpose,
        predicted_stay,
        probability,
        lat,
        lon,
    })
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line. Fields
/// stay text; numbers are parsed per column later.
fn read_csv<R: Read>(source: R) -> Result<RawTable> {
    let mut reader = csv::Reader::from_reader(source);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV line {}", row_no + 2))?;
        rows.push(record.iter().map(Cell::field).collect());
    }

    Ok(RawTable { headers, rows })
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "year": 2016, "region": "Western Europe", "market": "France",
///     "dur_stay": 4, "mode": "Air", "purpose": "Holiday",
///     "predict_stay": 3.8, "15_more_prob": 0.42, "lat": 46.2, "lon": 2.2 },
///   ...
/// ]
/// ```
fn parse_json(text: &str) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let records = root.as_array().context("Expected top-level JSON array")?;

    // Headers are the union of keys, in first-seen order.
    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(JsonValue::as_object)
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(Cell::Null))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> Cell {
    match val {
        JsonValue::String(s) => Cell::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Cell::Integer(i)
            } else if let Some(f) = n.as_f64() {
                Cell::Float(f)
            } else {
                Cell::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => Cell::Bool(*b),
        JsonValue::Null => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Read the `london_index` sheet of a workbook, falling back to the first
/// sheet. Row 1 holds the headers.
fn read_spreadsheet(path: &Path) -> Result<RawTable> {
    let mut workbook = open_workbook_auto(path).context("opening spreadsheet")?;
    let names = workbook.sheet_names();
    let sheet = names
        .iter()
        .find(|n| n.eq_ignore_ascii_case(SPREADSHEET_SHEET))
        .or_else(|| names.first())
        .cloned()
        .context("spreadsheet has no sheets")?;
    if !sheet.eq_ignore_ascii_case(SPREADSHEET_SHEET) {
        log::warn!("No '{SPREADSHEET_SHEET}' sheet, reading '{sheet}' instead");
    }

    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("reading sheet '{sheet}'"))?;
    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|r| r.iter().map(|c| c.to_string()).collect())
        .unwrap_or_default();
    let rows = rows.map(|r| r.iter().map(spreadsheet_to_cell).collect()).collect();

    Ok(RawTable { headers, rows })
}

fn spreadsheet_to_cell(data: &Data) -> Cell {
    match data {
        Data::Int(i) => Cell::Integer(*i),
        Data::Float(f) => Cell::Float(*f),
        Data::String(s) => Cell::field(s),
        Data::Bool(b) => Cell::Bool(*b),
        Data::Empty => Cell::Null,
        other => Cell::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with one flat column per field.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`).
fn read_parquet(path: &Path) -> Result<RawTable> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let headers: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = RawTable {
        headers,
        rows: Vec::new(),
    };

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for row in 0..batch.num_rows() {
            table
                .rows
                .push(batch.columns().iter().map(|col| extract_cell(col, row)).collect());
        }
    }

    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Cell {
    if col.is_null(row) {
        return Cell::Null;
    }
    let typed = match col.data_type() {
        DataType::Utf8 => col.as_string_opt::<i32>().map(|a| Cell::Text(a.value(row).to_string())),
        DataType::LargeUtf8 => {
            col.as_string_opt::<i64>().map(|a| Cell::Text(a.value(row).to_string()))
        }
        DataType::Int32 => col
            .as_primitive_opt::<Int32Type>()
            .map(|a| Cell::Integer(a.value(row) as i64)),
        DataType::Int64 => col
            .as_primitive_opt::<Int64Type>()
            .map(|a| Cell::Integer(a.value(row))),
        DataType::Float32 => col
            .as_primitive_opt::<Float32Type>()
            .map(|a| Cell::Float(a.value(row) as f64)),
        DataType::Float64 => col
            .as_primitive_opt::<Float64Type>()
            .map(|a| Cell::Float(a.value(row))),
        DataType::Boolean => col.as_boolean_opt().map(|a| Cell::Bool(a.value(row))),
        _ => None,
    };
    // Dictionary-encoded strings, small ints and the like go through Arrow's
    // own formatter.
    typed.unwrap_or_else(|| match array_value_to_string(col.as_ref(), row) {
        Ok(s) => Cell::guess(&s),
        Err(_) => Cell::Null,
    })
}
