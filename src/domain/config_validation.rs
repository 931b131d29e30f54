//! Configuration validation.
//!
//! Builds a RunConfig from the `[data]`, `[backtest]` and `[grid]` sections,
//! falling back to RunConfig defaults for absent keys.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::domain::backtest::RunConfig;
use crate::domain::error::EmaGridError;
use crate::domain::execution::ExecutionConfig;
use crate::domain::frequency::DataFrequency;
use crate::domain::ohlcv::parse_timestamp;
use crate::domain::selection::RankMetric;
use crate::ports::config_port::ConfigPort;

pub fn build_run_config(config: &dyn ConfigPort) -> Result<RunConfig, EmaGridError> {
    let defaults = RunConfig::default();

    let ticker = read_string(config, "data", "ticker").unwrap_or(defaults.ticker);
    let data_path = read_string(config, "data", "path")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("data/{ticker}.csv")));
    let start_date = match config.get_string("data", "start_date").map(|s| s.trim().to_string()) {
        None => defaults.start_date,
        Some(s) if s.is_empty() || s.eq_ignore_ascii_case("none") => None,
        Some(s) => Some(parse_bound(&s, "start_date", Bound::Start)?),
    };
    let end_date = read_string(config, "data", "end_date")
        .map(|s| parse_bound(&s, "end_date", Bound::End))
        .transpose()?;
    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start > end {
            return Err(invalid("data", "start_date", "start_date must not be after end_date"));
        }
    }

    let execution = ExecutionConfig {
        initial_cash: read_f64(config, "backtest", "initial_cash", defaults.execution.initial_cash)?,
        fee_rate: read_f64(config, "backtest", "fee_rate", defaults.execution.fee_rate)?,
        slippage_rate: read_f64(config, "backtest", "slippage_rate", defaults.execution.slippage_rate)?,
    };
    validate_execution(&execution)?;

    let training_ratio = read_f64(config, "backtest", "training_ratio", defaults.training_ratio)?;
    if !(training_ratio > 0.0 && training_ratio <= 1.0) {
        return Err(invalid("backtest", "training_ratio", "training_ratio must be in (0, 1]"));
    }

    let frequency = match read_string(config, "backtest", "data_frequency") {
        Some(code) => code.parse::<DataFrequency>()?,
        None => defaults.frequency,
    };

    let batch_size = read_usize(config, "backtest", "batch_size", defaults.batch_size)?;
    if batch_size == 0 {
        return Err(invalid("backtest", "batch_size", "batch_size must be a positive integer"));
    }

    let min_trades_per_year = read_f64(
        config,
        "backtest",
        "min_trades_per_year",
        defaults.min_trades_per_year,
    )?;
    if min_trades_per_year < 0.0 {
        return Err(invalid(
            "backtest",
            "min_trades_per_year",
            "min_trades_per_year must be non-negative",
        ));
    }

    let rank_metric = match read_string(config, "backtest", "rank_metric") {
        Some(name) => name.parse::<RankMetric>()?,
        None => defaults.rank_metric,
    };

    let fast_periods = read_periods(config, "fast_ema_periods", defaults.fast_periods)?;
    let medium_periods = read_periods(config, "medium_ema_periods", defaults.medium_periods)?;
    let slow_periods = read_periods(config, "slow_ema_periods", defaults.slow_periods)?;

    Ok(RunConfig {
        ticker,
        data_path,
        start_date,
        end_date,
        training_ratio,
        frequency,
        execution,
        batch_size,
        min_trades_per_year,
        rank_metric,
        fast_periods,
        medium_periods,
        slow_periods,
    })
}

/// Parse `start..end:step` (end exclusive, step defaults to 1) or a comma list.
///
/// Syntax errors are `ConfigInvalid` for `[grid] key`; any zero or negative
/// period is `InvalidPeriod`.
pub fn parse_period_list(key: &str, value: &str) -> Result<Vec<usize>, EmaGridError> {
    let syntax = |reason: String| invalid("grid", key, &reason);
    let value = value.trim();
    if value.is_empty() {
        return Err(syntax("period list is empty".to_string()));
    }

    let periods: Vec<i64> = if let Some((start, rest)) = value.split_once("..") {
        let (end, step) = match rest.split_once(':') {
            Some((end, step)) => (end, parse_int(step).map_err(syntax)?),
            None => (rest, 1),
        };
        let start = parse_int(start).map_err(syntax)?;
        let end = parse_int(end).map_err(syntax)?;
        if step <= 0 {
            return Err(syntax(format!("range step must be positive, got {step}")));
        }
        if start >= end {
            return Err(syntax(format!("range {start}..{end} is empty")));
        }
        (start..end).step_by(step as usize).collect()
    } else {
        value
            .split(',')
            .map(parse_int)
            .collect::<Result<Vec<_>, _>>()
            .map_err(syntax)?
    };

    periods
        .into_iter()
        .map(|p| {
            usize::try_from(p)
                .ok()
                .filter(|&p| p > 0)
                .ok_or(EmaGridError::InvalidPeriod { period: p })
        })
        .collect()
}

fn parse_int(s: &str) -> Result<i64, String> {
    s.trim()
        .parse::<i64>()
        .map_err(|_| format!("'{}' is not an integer", s.trim()))
}

fn read_periods(
    config: &dyn ConfigPort,
    key: &str,
    default: Vec<usize>,
) -> Result<Vec<usize>, EmaGridError> {
    match read_string(config, "grid", key) {
        Some(value) => parse_period_list(key, &value),
        None => Ok(default),
    }
}

fn validate_execution(execution: &ExecutionConfig) -> Result<(), EmaGridError> {
    if execution.initial_cash <= 0.0 {
        return Err(invalid("backtest", "initial_cash", "initial_cash must be positive"));
    }
    if execution.fee_rate < 0.0 {
        return Err(invalid("backtest", "fee_rate", "fee_rate must be non-negative"));
    }
    if !(0.0..1.0).contains(&execution.slippage_rate) {
        return Err(invalid("backtest", "slippage_rate", "slippage_rate must be in [0, 1)"));
    }
    Ok(())
}

/// Trimmed value, `None` when the key is absent or blank.
fn read_string(config: &dyn ConfigPort, section: &str, key: &str) -> Option<String> {
    config
        .get_string(section, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_f64(config: &dyn ConfigPort, section: &str, key: &str, default: f64) -> Result<f64, EmaGridError> {
    match read_string(config, section, key) {
        None => Ok(default),
        Some(s) => s
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| invalid(section, key, &format!("'{s}' is not a number"))),
    }
}

fn read_usize(config: &dyn ConfigPort, section: &str, key: &str, default: usize) -> Result<usize, EmaGridError> {
    match read_string(config, section, key) {
        None => Ok(default),
        Some(s) => s
            .parse::<usize>()
            .map_err(|_| invalid(section, key, &format!("'{s}' is not a positive integer"))),
    }
}

#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// A bare date as an end bound covers the whole day.
fn parse_bound(value: &str, field: &str, bound: Bound) -> Result<NaiveDateTime, EmaGridError> {
    let parsed = match (NaiveDate::parse_from_str(value, "%Y-%m-%d"), bound) {
        (Ok(day), Bound::End) => NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999).map(|t| day.and_time(t)),
        _ => parse_timestamp(value),
    };
    parsed.ok_or_else(|| EmaGridError::ConfigInvalid {
        section: "data".to_string(),
        key: field.to_string(),
        reason: format!("invalid {} format, expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS", field),
    })
}

fn invalid(section: &str, key: &str, reason: &str) -> EmaGridError {
    EmaGridError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}
