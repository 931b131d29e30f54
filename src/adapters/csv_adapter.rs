//! CSV file data adapter.
//!
//! Reads `date,open,high,low,close,volume` files with a header row. Columns
//! are located by case-insensitive name, so the `Date,Open,...,Close` layout
//! written by pandas is accepted and extra columns are ignored. The date
//! column may be named `datetime` or `timestamp` and may carry a time of day.

use crate::domain::error::EmaGridError;
use crate::domain::ohlcv::{parse_timestamp, OhlcvBar};
use crate::ports::data_port::DataPort;
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const COLUMNS: [&str; 6] = ["date", "open", "high", "low", "close", "volume"];
const TIMESTAMP_ALIASES: [&str; 3] = ["date", "datetime", "timestamp"];

enum Location {
    /// `<dir>/<ticker>.csv`
    Directory(PathBuf),
    /// One file, whatever the ticker.
    File(PathBuf),
}

pub struct CsvAdapter {
    location: Location,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self {
            location: Location::Directory(base_path),
        }
    }

    pub fn from_file(path: PathBuf) -> Self {
        Self {
            location: Location::File(path),
        }
    }

    fn csv_path(&self, ticker: &str) -> PathBuf {
        match &self.location {
            Location::Directory(dir) => dir.join(format!("{}.csv", ticker)),
            Location::File(path) => path.clone(),
        }
    }
}

fn format_error(reason: String) -> EmaGridError {
    EmaGridError::DataFormat { reason }
}

fn cell<'r>(
    record: &'r csv::StringRecord,
    col: usize,
    name: &str,
    line: usize,
) -> Result<&'r str, EmaGridError> {
    match record.get(col) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(format_error(format!("line {}: empty {} value", line, name))),
    }
}

fn number(record: &csv::StringRecord, col: usize, name: &str, line: usize) -> Result<f64, EmaGridError> {
    let raw = cell(record, col, name, line)?;
    raw.parse::<f64>().map_err(|e| {
        format_error(format!("line {}: invalid {} value '{}': {}", line, name, raw, e))
    })
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    let find = |alias: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(alias));
    if name == "date" {
        TIMESTAMP_ALIASES.iter().find_map(|alias| find(alias))
    } else {
        find(name)
    }
}

/// Parses CSV content into time-sorted bars within the inclusive window.
pub fn parse_ohlcv(
    content: &str,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<Vec<OhlcvBar>, EmaGridError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| format_error(format!("CSV header error: {}", e)))?
        .clone();
    let mut index = [0usize; 6];
    for (slot, name) in index.iter_mut().zip(COLUMNS) {
        *slot = column_index(&headers, name).ok_or_else(|| format_error(format!("missing {} column", name)))?;
    }
    let [date_col, open_col, high_col, low_col, close_col, volume_col] = index;

    let mut bars = Vec::new();
    for (row, result) in rdr.records().enumerate() {
        // header is line 1
        let line = row + 2;
        let record = result.map_err(|e| format_error(format!("CSV parse error: {}", e)))?;

        let raw = cell(&record, date_col, "date", line)?;
        let timestamp = parse_timestamp(raw).ok_or_else(|| {
            format_error(format!(
                "line {}: invalid date '{}', expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS",
                line, raw
            ))
        })?;

        if start.is_some_and(|s| timestamp < s) || end.is_some_and(|e| timestamp > e) {
            continue;
        }

        let bar = OhlcvBar {
            timestamp,
            open: number(&record, open_col, "open", line)?,
            high: number(&record, high_col, "high", line)?,
            low: number(&record, low_col, "low", line)?,
            close: number(&record, close_col, "close", line)?,
            volume: number(&record, volume_col, "volume", line)?,
        };
        if let Some(field) = bar.invalid_field() {
            return Err(format_error(format!("line {}: {} out of range", line, field)));
        }
        bars.push(bar);
    }

    bars.sort_by_key(|b| b.timestamp);
    if let Some(pair) = bars.windows(2).find(|pair| pair[0].timestamp == pair[1].timestamp) {
        return Err(format_error(format!("duplicate timestamp {}", pair[0].timestamp)));
    }
    Ok(bars)
}

fn read_file(path: &Path) -> Result<String, EmaGridError> {
    fs::read_to_string(path).map_err(|e| {
        EmaGridError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read {}: {}", path.display(), e),
        ))
    })
}

impl DataPort for CsvAdapter {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<OhlcvBar>, EmaGridError> {
        let path = self.csv_path(ticker);
        let content = read_file(&path)?;
        let bars = parse_ohlcv(&content, start, end)?;
        debug!(ticker, path = %path.display(), bars = bars.len(), "loaded CSV price data");
        Ok(bars)
    }
}
