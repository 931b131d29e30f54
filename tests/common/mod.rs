#![allow(dead_code)]

use chrono::{Days, Duration, NaiveDate, NaiveDateTime};
use emagrid::domain::backtest::{RunConfig, StrategyReport};
use emagrid::domain::error::EmaGridError;
use emagrid::domain::execution::ExecutionConfig;
pub use emagrid::domain::ohlcv::OhlcvBar;
use emagrid::domain::price_series::PriceSeries;
use emagrid::ports::data_port::DataPort;
use emagrid::ports::report_port::ReportPort;
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, ticker: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(ticker.to_string(), bars);
        self
    }

    pub fn with_error(mut self, ticker: &str, reason: &str) -> Self {
        self.errors.insert(ticker.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<OhlcvBar>, EmaGridError> {
        if let Some(reason) = self.errors.get(ticker) {
            return Err(EmaGridError::DataFormat {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(ticker)
            .map(|bars| {
                bars.iter()
                    .filter(|b| start.is_none_or(|s| b.timestamp >= s))
                    .filter(|b| end.is_none_or(|e| b.timestamp <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Records the paths it was asked to write without touching the filesystem.
#[derive(Default)]
pub struct RecordingReportPort {
    pub written: RefCell<Vec<PathBuf>>,
}

impl ReportPort for RecordingReportPort {
    fn write(&self, _report: &StrategyReport, output_path: &Path) -> Result<(), EmaGridError> {
        self.written.borrow_mut().push(output_path.to_path_buf());
        Ok(())
    }
}

/// Midnight on the given day.
pub fn date(y: i32, m: u32, d: u32) -> NaiveDateTime {
    at(y, m, d, 0, 0)
}

pub fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub fn make_bar(timestamp: NaiveDateTime, close: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp,
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 1000.0,
    }
}

/// One bar per calendar day starting 2020-01-01.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = date(2020, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(start.checked_add_days(Days::new(i as u64)).unwrap(), close))
        .collect()
}

/// One bar per hour starting 2024-01-02 09:30.
pub fn hourly_bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    let start = at(2024, 1, 2, 9, 30);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| make_bar(start + Duration::hours(i as i64), close))
        .collect()
}

pub fn series_from_closes(closes: &[f64]) -> PriceSeries {
    PriceSeries::from_bars(&bars_from_closes(closes)).unwrap()
}

/// Oscillating series with a mild drift; crosses often for short periods.
pub fn wave_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| 100.0 + 10.0 * (i as f64 / 7.0).sin() + 4.0 * (i as f64 / 23.0).cos() + 0.03 * i as f64)
        .collect()
}

/// `flat` bars at 100 followed by a rising ramp of `ramp` bars.
pub fn flat_then_ramp(flat: usize, ramp: usize) -> Vec<f64> {
    (0..flat)
        .map(|_| 100.0)
        .chain((1..=ramp).map(|i| 100.0 + i as f64))
        .collect()
}

pub fn zero_cost() -> ExecutionConfig {
    ExecutionConfig {
        initial_cash: 100_000.0,
        fee_rate: 0.0,
        slippage_rate: 0.0,
    }
}

pub fn small_run_config() -> RunConfig {
    RunConfig {
        ticker: "TEST".into(),
        fast_periods: vec![2, 3, 5],
        medium_periods: vec![8, 12],
        slow_periods: vec![10, 15, 20],
        min_trades_per_year: 0.0,
        training_ratio: 0.6,
        start_date: None,
        ..RunConfig::default()
    }
}
