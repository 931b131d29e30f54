//! CSV report adapter.
//!
//! Writes the per-bar series of the winning strategy to the output path and
//! a `metric,value` table to `<stem>_metrics.csv` next to it. Undefined
//! values are written as empty cells.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::domain::backtest::StrategyReport;
use crate::domain::error::EmaGridError;
use crate::domain::metrics::METRIC_NAMES;
use crate::domain::ohlcv::format_timestamp;
use crate::ports::report_port::ReportPort;

pub struct CsvReportAdapter;

impl CsvReportAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CsvReportAdapter {
    fn default() -> Self {
        Self::new()
    }
}

/// `<dir>/<stem>_metrics.csv` for an output path `<dir>/<stem>.<ext>`.
pub fn metrics_path(output_path: &Path) -> PathBuf {
    let stem = output_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    output_path.with_file_name(format!("{}_metrics.csv", stem))
}

fn cell(value: f64) -> String {
    if value.is_finite() {
        value.to_string()
    } else {
        String::new()
    }
}

fn csv_error(e: csv::Error) -> EmaGridError {
    EmaGridError::Io(std::io::Error::other(e))
}

fn check_lengths(report: &StrategyReport) -> Result<(), EmaGridError> {
    let expected = report.timestamps.len();
    let columns = [
        ("closes", report.closes.len()),
        ("ema_fast", report.ema_fast.len()),
        ("ema_medium", report.ema_medium.len()),
        ("ema_slow", report.ema_slow.len()),
        ("entries", report.signals.entries.len()),
        ("exits", report.signals.exits.len()),
    ];
    for (what, actual) in columns {
        if actual != expected {
            return Err(EmaGridError::LengthMismatch {
                what: what.to_string(),
                expected,
                actual,
            });
        }
    }
    Ok(())
}

fn write_series(report: &StrategyReport, path: &Path) -> Result<(), EmaGridError> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
    wtr.write_record([
        "date",
        "close",
        "ema_fast",
        "ema_medium",
        "ema_slow",
        "entry",
        "exit",
    ])
    .map_err(csv_error)?;

    for (i, &timestamp) in report.timestamps.iter().enumerate() {
        wtr.write_record([
            format_timestamp(timestamp),
            cell(report.closes[i]),
            cell(report.ema_fast.values[i]),
            cell(report.ema_medium.values[i]),
            cell(report.ema_slow.values[i]),
            report.signals.entries[i].to_string(),
            report.signals.exits[i].to_string(),
        ])
        .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_metrics(report: &StrategyReport, path: &Path) -> Result<(), EmaGridError> {
    let mut wtr = csv::Writer::from_path(path).map_err(csv_error)?;
    wtr.write_record(["metric", "value"]).map_err(csv_error)?;

    for name in METRIC_NAMES {
        let value = report.metrics.get(name).unwrap_or(f64::NAN);
        wtr.write_record([name.to_string(), cell(value)])
            .map_err(csv_error)?;
    }
    let counts = [
        ("total_trades", report.metrics.total_trades),
        ("fast_period", report.triple.fast()),
        ("medium_period", report.triple.medium()),
        ("slow_period", report.triple.slow()),
    ];
    for (name, value) in counts {
        wtr.write_record([name.to_string(), value.to_string()])
            .map_err(csv_error)?;
    }
    wtr.flush()?;
    Ok(())
}

impl ReportPort for CsvReportAdapter {
    fn write(&self, report: &StrategyReport, output_path: &Path) -> Result<(), EmaGridError> {
        check_lengths(report)?;
        write_series(report, output_path)?;
        let metrics_file = metrics_path(output_path);
        write_metrics(report, &metrics_file)?;
        info!(
            series = %output_path.display(),
            metrics = %metrics_file.display(),
            "report written"
        );
        Ok(())
    }
}
