//! End-to-end run: search on the training slice, then evaluate the winner on
//! the full sample.
//!
//! RunConfig carries every parameter of a run; defaults reproduce the
//! reference QQQ setup.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use tracing::info;

use super::combination::{build_combinations, EmaPeriodTriple};
use super::error::EmaGridError;
use super::execution::ExecutionConfig;
use super::frequency::DataFrequency;
use super::grid_search::{search, GridSearchConfig, GridSearchRow};
use super::indicator::ema_cache::EmaCache;
use super::indicator::EmaSeries;
use super::metrics::PerformanceMetrics;
use super::portfolio::SimulatedPortfolio;
use super::price_series::PriceSeries;
use super::selection::{select_by, RankMetric};
use super::signal::{ema_signals, SignalSeries};
use super::simulator::simulate;

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub ticker: String,
    pub data_path: PathBuf,
    /// Inclusive bounds on bar timestamps.
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    /// Leading fraction of the sample used for the search, in (0, 1].
    pub training_ratio: f64,
    pub frequency: DataFrequency,
    pub execution: ExecutionConfig,
    pub batch_size: usize,
    pub min_trades_per_year: f64,
    pub rank_metric: RankMetric,
    pub fast_periods: Vec<usize>,
    pub medium_periods: Vec<usize>,
    pub slow_periods: Vec<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            ticker: "QQQ".into(),
            data_path: PathBuf::from("data/QQQ.csv"),
            start_date: NaiveDate::from_ymd_opt(2018, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            end_date: None,
            training_ratio: 0.60,
            frequency: DataFrequency::DAILY,
            execution: ExecutionConfig::default(),
            batch_size: 1000,
            min_trades_per_year: 2.0,
            rank_metric: RankMetric::SharpeRatio,
            fast_periods: (4..40).step_by(3).collect(),
            medium_periods: (80..200).step_by(3).collect(),
            slow_periods: (100..200).step_by(3).collect(),
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), EmaGridError> {
        if !(self.training_ratio > 0.0 && self.training_ratio <= 1.0) {
            return Err(EmaGridError::ConfigInvalid {
                section: "backtest".into(),
                key: "training_ratio".into(),
                reason: "must be in (0, 1]".into(),
            });
        }
        self.grid_search_config().validate()
    }

    pub fn grid_search_config(&self) -> GridSearchConfig {
        GridSearchConfig {
            batch_size: self.batch_size,
            execution: self.execution,
            frequency: self.frequency,
            min_trades_per_year: self.min_trades_per_year,
        }
    }

    pub fn triples(&self) -> Vec<EmaPeriodTriple> {
        build_combinations(&self.fast_periods, &self.medium_periods, &self.slow_periods)
    }
}

/// Everything the presentation side needs about the winning triple.
#[derive(Debug, Clone)]
pub struct StrategyReport {
    pub ticker: String,
    pub triple: EmaPeriodTriple,
    /// Training-sample score that won the search.
    pub best_row: GridSearchRow,
    pub rank_metric: RankMetric,
    pub timestamps: Vec<NaiveDateTime>,
    pub closes: Vec<f64>,
    pub ema_fast: EmaSeries,
    pub ema_medium: EmaSeries,
    pub ema_slow: EmaSeries,
    pub signals: SignalSeries,
    pub portfolio: SimulatedPortfolio,
    pub metrics: PerformanceMetrics,
    pub training_bars: usize,
    pub combinations: usize,
    pub excluded: usize,
}

pub fn run_backtest(prices: &PriceSeries, config: &RunConfig) -> Result<StrategyReport, EmaGridError> {
    config.validate()?;

    let training = prices.training_slice(config.training_ratio);
    if training.len() < 2 {
        return Err(EmaGridError::InsufficientData {
            ticker: config.ticker.clone(),
            bars: training.len(),
            minimum: 2,
        });
    }

    let triples = config.triples();
    if triples.is_empty() {
        return Err(EmaGridError::EmptySearchSpace {
            reason: "no period triple satisfies fast < medium and fast < slow".into(),
        });
    }
    info!(
        ticker = %config.ticker,
        bars = prices.len(),
        training_bars = training.len(),
        combinations = triples.len(),
        "running backtest"
    );

    let results = search(&training, &triples, config.grid_search_config())?;
    let best = select_by(&results, config.rank_metric)?.clone();
    info!(
        triple = %best.triple,
        metric = %config.rank_metric,
        value = config.rank_metric.value(&best),
        "best combination selected"
    );

    let cache = EmaCache::build(prices.closes(), best.triple.periods())?;
    let signals = ema_signals(&cache, &best.triple)?;
    let portfolio = simulate(prices.closes(), &signals.entries, &signals.exits, &config.execution)?;
    let metrics = PerformanceMetrics::compute(&portfolio, config.frequency);

    Ok(StrategyReport {
        ticker: config.ticker.clone(),
        triple: best.triple,
        rank_metric: config.rank_metric,
        timestamps: prices.timestamps().to_vec(),
        closes: prices.closes().to_vec(),
        ema_fast: cache.require(best.triple.fast())?.clone(),
        ema_medium: cache.require(best.triple.medium())?.clone(),
        ema_slow: cache.require(best.triple.slow())?.clone(),
        signals,
        portfolio,
        metrics,
        training_bars: training.len(),
        combinations: triples.len(),
        excluded: results.excluded.len(),
        best_row: best,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Days;

    fn series(closes: Vec<f64>) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2019, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let dates = (0..closes.len())
            .map(|i| start.checked_add_days(Days::new(i as u64)).unwrap())
            .collect();
        PriceSeries::new(dates, closes).unwrap()
    }

    fn wave(n: usize) -> PriceSeries {
        series(
            (0..n)
                .map(|i| 100.0 + 8.0 * (i as f64 / 6.0).sin() + 0.02 * i as f64)
                .collect(),
        )
    }

    fn small_config() -> RunConfig {
        RunConfig {
            fast_periods: vec![2, 3],
            medium_periods: vec![6, 8],
            slow_periods: vec![10, 12],
            min_trades_per_year: 0.0,
            ..RunConfig::default()
        }
    }

    #[test]
    fn default_grid_matches_reference_ranges() {
        let config = RunConfig::default();
        assert_eq!(config.fast_periods.first(), Some(&4));
        assert_eq!(config.fast_periods.last(), Some(&37));
        assert_eq!(config.medium_periods.first(), Some(&80));
        assert_eq!(config.medium_periods.last(), Some(&197));
        assert_eq!(config.slow_periods.last(), Some(&199));
        assert_eq!(
            config.triples().len(),
            config.fast_periods.len() * config.medium_periods.len() * config.slow_periods.len()
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn training_ratio_out_of_range_fails() {
        for ratio in [0.0, -0.5, 1.5, f64::NAN] {
            let config = RunConfig {
                training_ratio: ratio,
                ..small_config()
            };
            let err = run_backtest(&wave(100), &config).unwrap_err();
            assert!(matches!(err, EmaGridError::ConfigInvalid { ref key, .. } if key == "training_ratio"));
        }
    }

    #[test]
    fn empty_search_space_fails() {
        let config = RunConfig {
            fast_periods: vec![50],
            medium_periods: vec![10],
            slow_periods: vec![20],
            ..small_config()
        };
        let err = run_backtest(&wave(100), &config).unwrap_err();
        assert!(matches!(err, EmaGridError::EmptySearchSpace { .. }));
    }

    #[test]
    fn tiny_training_slice_fails() {
        let err = run_backtest(&wave(3), &small_config()).unwrap_err();
        assert!(matches!(err, EmaGridError::InsufficientData { bars: 1, .. }));
    }

    #[test]
    fn report_covers_full_sample() {
        let prices = wave(300);
        let report = run_backtest(&prices, &small_config()).unwrap();

        assert_eq!(report.timestamps.len(), 300);
        assert_eq!(report.closes.len(), 300);
        assert_eq!(report.ema_fast.len(), 300);
        assert_eq!(report.ema_medium.period, report.triple.medium());
        assert_eq!(report.signals.len(), 300);
        assert_eq!(report.training_bars, 180);
        assert_eq!(report.combinations, small_config().triples().len());
        assert_eq!(report.portfolio.bar_count(), 300);
    }

    #[test]
    fn full_sample_restricted_to_training_reproduces_search_score() {
        let prices = wave(300);
        let config = small_config();
        let report = run_backtest(&prices, &config).unwrap();

        let n = report.training_bars;
        let portfolio = simulate(
            &report.closes[..n],
            &report.signals.entries[..n],
            &report.signals.exits[..n],
            &config.execution,
        )
        .unwrap();
        let sharpe = crate::domain::metrics::sharpe_ratio(
            &portfolio.periodic_returns(),
            config.frequency.periods_per_year(),
        );
        assert!((sharpe - report.best_row.sharpe_ratio).abs() < 1e-12);
        assert_eq!(portfolio.trade_count(), report.best_row.trade_count);
    }
}
