use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, BooleanArray, Float32Array, Float64Array, Int32Array, Int64Array,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Row, Table};
use crate::config::ColumnMapping;
use crate::error::DashError;

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where the dataset comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl DataSource {
    /// `http://` and `https://` prefixes select a URL, anything else a path.
    pub fn parse(s: &str) -> Self {
        let trimmed = s.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            DataSource::Url(trimmed.to_string())
        } else {
            DataSource::Path(PathBuf::from(trimmed))
        }
    }

    /// Lower-cased extension of the path, or of the URL path without its
    /// query string.
    fn extension(&self) -> String {
        let name = match self {
            DataSource::Path(path) => path.to_string_lossy().into_owned(),
            DataSource::Url(url) => url
                .split(['?', '#'])
                .next()
                .unwrap_or_default()
                .to_string(),
        };
        Path::new(&name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase()
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Path(path) => write!(f, "{}", path.display()),
            DataSource::Url(url) => write!(f, "{url}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load the dataset and check that every column the dashboard plots exists.
///
/// Dispatch by extension:
/// * `.csv` (or unknown) – header row + records
/// * `.json`             – `[{ "col": value, ... }, ...]`
/// * `.parquet` / `.pq`  – flat scalar columns, local files only
pub fn load_table(source: &DataSource, mapping: &ColumnMapping) -> Result<Table, DashError> {
    let unavailable = |e: anyhow::Error| DashError::DataUnavailable {
        source_id: source.to_string(),
        reason: format!("{e:#}"),
    };

    let table = load(source).map_err(unavailable)?;

    let missing: Vec<&str> = mapping
        .required_columns()
        .into_iter()
        .filter(|col| !table.has_column(col))
        .collect();
    if !missing.is_empty() {
        return Err(unavailable(anyhow::anyhow!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    }

    log::info!(
        "Loaded {} rows with columns {:?} from {source}",
        table.len(),
        table.column_names()
    );
    Ok(table)
}

fn load(source: &DataSource) -> Result<Table> {
    let ext = source.extension();
    match source {
        DataSource::Path(path) => match ext.as_str() {
            "parquet" | "pq" => load_parquet(path),
            "json" => {
                let text = std::fs::read_to_string(path).context("reading JSON file")?;
                parse_json(&text)
            }
            _ => {
                let file = std::fs::File::open(path)
                    .with_context(|| format!("opening {}", path.display()))?;
                parse_csv(file)
            }
        },
        DataSource::Url(url) => {
            let body = fetch_url(url)?;
            match ext.as_str() {
                "parquet" | "pq" => bail!("Parquet is only supported for local files"),
                "json" => parse_json(std::str::from_utf8(&body).context("decoding JSON body")?),
                _ => parse_csv(body.as_slice()),
            }
        }
    }
}

fn fetch_url(url: &str) -> Result<Vec<u8>> {
    log::debug!("Fetching dataset from {url}");
    let response = reqwest::blocking::get(url)
        .with_context(|| format!("requesting {url}"))?
        .error_for_status()
        .with_context(|| format!("fetching {url}"))?;
    let bytes = response.bytes().context("reading response body")?;
    Ok(bytes.to_vec())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Header row with column names; every record becomes one [`Row`].
/// Cells are typed with [`CellValue::guess`].
fn parse_csv<R: Read>(input: R) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(input);
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        bail!("CSV has no header row");
    }

    let mut rows = Vec::new();

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.len() != headers.len() {
            bail!(
                "CSV row {row_no}: expected {} fields, found {}",
                headers.len(),
                record.len()
            );
        }

        let cells: BTreeMap<String, CellValue> = headers
            .iter()
            .zip(record.iter())
            .map(|(col, value)| (col.clone(), CellValue::guess(value)))
            .collect();
        rows.push(Row { cells });
    }

    Ok(Table::from_rows(headers, rows))
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented JSON, the default `df.to_json(orient='records')`:
///
/// ```json
/// [
///   { "horsepower": 111, "highway-mpg": 27, "body-style": "convertible" },
///   ...
/// ]
/// ```
fn parse_json(text: &str) -> Result<Table> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;

    let records = root.as_array().context("Expected top-level JSON array")?;

    let mut header: Vec<String> = Vec::new();
    let mut rows = Vec::with_capacity(records.len());

    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;

        let mut cells = BTreeMap::new();
        for (key, val) in obj {
            if !header.contains(key) {
                header.push(key.clone());
            }
            cells.insert(key.clone(), json_to_cell(val));
        }
        rows.push(Row { cells });
    }

    Ok(Table::from_rows(header, rows))
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::guess(s),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::String(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat scalar columns, as written by
/// `df.to_parquet()` (Pandas) or `df.write_parquet()` (Polars).
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let header: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut rows = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        for row in 0..batch.num_rows() {
            let mut cells = BTreeMap::new();
            for (col_idx, field) in schema.fields().iter().enumerate() {
                let value = extract_cell_value(batch.column(col_idx), row)
                    .with_context(|| format!("Row {row}, column '{}'", field.name()))?;
                cells.insert(field.name().clone(), value);
            }
            rows.push(Row { cells });
        }
    }

    Ok(Table::from_rows(header, rows))
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell_value(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let value = match col.data_type() {
        DataType::Utf8 => CellValue::guess(col.as_string::<i32>().value(row)),
        DataType::LargeUtf8 => CellValue::guess(col.as_string::<i64>().value(row)),
        DataType::Int32 => {
            let arr = downcast::<Int32Array>(col)?;
            CellValue::Integer(arr.value(row) as i64)
        }
        DataType::Int64 => CellValue::Integer(downcast::<Int64Array>(col)?.value(row)),
        DataType::Float32 => {
            let arr = downcast::<Float32Array>(col)?;
            CellValue::Float(arr.value(row) as f64)
        }
        DataType::Float64 => CellValue::Float(downcast::<Float64Array>(col)?.value(row)),
        DataType::Boolean => CellValue::Bool(downcast::<BooleanArray>(col)?.value(row)),
        other => bail!("unsupported column type {other:?}"),
    };
    Ok(value)
}

fn downcast<T: Array + 'static>(col: &Arc<dyn Array>) -> Result<&T> {
    col.as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("unexpected array layout for {:?}", col.data_type()))
}
