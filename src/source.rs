//! Record sources: spreadsheets, CSV files and JSON record arrays.
//!
//! Every source is first read into [`Row`]s (column name to JSON value) with
//! normalized column names, then decoded into [`Record`]s.

use anyhow::{Context, Result, bail};
use calamine::{Data, Range, Reader, open_workbook_auto};
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

use crate::record::Record;

/// One input row keyed by normalized column name.
pub type Row = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Json,
    Csv,
    Spreadsheet,
}

impl SourceFormat {
    /// Picks the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match ext.as_str() {
            "json" => Ok(SourceFormat::Json),
            "csv" => Ok(SourceFormat::Csv),
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => Ok(SourceFormat::Spreadsheet),
            _ => bail!(
                "unsupported input format for {} (expected .json, .csv, .xlsx, .xls or .ods)",
                path.display()
            ),
        }
    }
}

/// Trims a column name and replaces spaces and hyphens with underscores,
/// so `"Pontuação Atingida"` becomes `"Pontuação_Atingida"`.
pub fn normalize_column(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect()
}

/// Reads all rows from `path`, choosing the reader from the extension.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let rows = match SourceFormat::from_path(path)? {
        SourceFormat::Json => read_json_rows(path)?,
        SourceFormat::Csv => read_csv_rows(path)?,
        SourceFormat::Spreadsheet => read_spreadsheet_rows(path)?,
    };

    info!(rows = rows.len(), "Rows loaded");
    Ok(rows)
}

/// Reads and decodes all records from `path`.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    let rows = load_rows(path)?;
    records_from_rows(rows)
}

pub fn records_from_rows(rows: Vec<Row>) -> Result<Vec<Record>> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            serde_json::from_value(Value::Object(row))
                .with_context(|| format!("failed to decode row {}", idx + 1))
        })
        .collect()
}

fn normalize_row(row: Row) -> Row {
    row.into_iter()
        .map(|(k, v)| (normalize_column(&k), v))
        .collect()
}

fn read_json_rows(path: &Path) -> Result<Vec<Row>> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let value: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse JSON in {}", path.display()))?;

    let Value::Array(items) = value else {
        bail!("{} must contain a JSON array of records", path.display());
    };

    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| match item {
            Value::Object(row) => Ok(normalize_row(row)),
            other => bail!(
                "record {} in {} is not an object: {}",
                idx + 1,
                path.display(),
                other
            ),
        })
        .collect()
}

fn read_csv_rows(path: &Path) -> Result<Vec<Row>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("failed to read CSV header in {}", path.display()))?
        .iter()
        .map(normalize_column)
        .collect();
    debug!(?headers, "CSV header");

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.with_context(|| format!("malformed CSV in {}", path.display()))?;

        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(name, field)| {
                let value = if field.is_empty() {
                    Value::Null
                } else {
                    Value::String(field.to_string())
                };
                (name.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

fn read_spreadsheet_rows(path: &Path) -> Result<Vec<Row>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("failed to open workbook {}", path.display()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range
            .with_context(|| format!("failed to read first worksheet of {}", path.display()))?,
        None => bail!("workbook {} contains no sheets", path.display()),
    };

    Ok(rows_from_range(&range))
}

/// Converts a worksheet range into rows. The first row is the header;
/// rows with no values are skipped.
pub fn rows_from_range(range: &Range<Data>) -> Vec<Row> {
    let mut iter = range.rows();

    let Some(header) = iter.next() else {
        return Vec::new();
    };

    let columns: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| match cell {
            Data::Empty => format!("Unnamed: {}", idx),
            other => normalize_column(&other.to_string()),
        })
        .collect();
    debug!(?columns, "Worksheet header");

    iter.filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| {
            columns
                .iter()
                .zip(row.iter())
                .map(|(name, cell)| (name.clone(), cell_value(cell)))
                .collect()
        })
        .collect()
}

/// Maps a worksheet cell to a JSON value. Empty and error cells become null;
/// dates keep their serial number.
pub fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) => Value::String(s.clone()),
        Data::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Data::Int(i) => Value::Number((*i).into()),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Number::from_f64(dt.as_f64())
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Data::DateTimeIso(s) => Value::String(s.clone()),
        Data::DurationIso(s) => Value::String(s.clone()),
    }
}
