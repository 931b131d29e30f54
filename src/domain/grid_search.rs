//! Batched grid search over EMA period triples.
//!
//! EMAs are computed once for every distinct period, then triples are
//! evaluated in contiguous batches: signals per triple, one simulator call per
//! batch, Sharpe per column. Batch size only bounds how many portfolios are
//! alive at once; rows come out in enumeration order whatever its value.

use std::ops::ControlFlow;

use tracing::{debug, info, trace};

use super::combination::{distinct_periods, EmaPeriodTriple};
use super::error::EmaGridError;
use super::execution::ExecutionConfig;
use super::frequency::DataFrequency;
use super::indicator::ema_cache::EmaCache;
use super::metrics::sharpe_ratio;
use super::price_series::PriceSeries;
use super::signal::{ema_signals, SignalSeries};
use super::simulator::simulate_batch;

/// Lower bound on the sample span used by the activity filter.
const MIN_YEARS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridSearchConfig {
    pub batch_size: usize,
    pub execution: ExecutionConfig,
    pub frequency: DataFrequency,
    /// Triples with fewer closed trades per year than this are excluded.
    pub min_trades_per_year: f64,
}

impl Default for GridSearchConfig {
    fn default() -> Self {
        GridSearchConfig {
            batch_size: 1000,
            execution: ExecutionConfig::default(),
            frequency: DataFrequency::DAILY,
            min_trades_per_year: 2.0,
        }
    }
}

impl GridSearchConfig {
    pub fn validate(&self) -> Result<(), EmaGridError> {
        if self.batch_size == 0 {
            return Err(EmaGridError::ConfigInvalid {
                section: "backtest".into(),
                key: "batch_size".into(),
                reason: "must be at least 1".into(),
            });
        }
        if !self.min_trades_per_year.is_finite() || self.min_trades_per_year < 0.0 {
            return Err(EmaGridError::ConfigInvalid {
                section: "backtest".into(),
                key: "min_trades_per_year".into(),
                reason: "must be finite and non-negative".into(),
            });
        }
        self.execution.validate()
    }
}

/// Score of one triple on the training sample.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSearchRow {
    pub triple: EmaPeriodTriple,
    pub sharpe_ratio: f64,
    pub total_return: f64,
    pub trade_count: usize,
    pub trades_per_year: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExclusionReason {
    InsufficientActivity { trades_per_year: f64 },
    SimulationFailed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExcludedTriple {
    pub triple: EmaPeriodTriple,
    pub reason: ExclusionReason,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GridSearchResult {
    pub rows: Vec<GridSearchRow>,
    pub excluded: Vec<ExcludedTriple>,
}

impl GridSearchResult {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Triples that were scored or excluded.
    pub fn evaluated(&self) -> usize {
        self.rows.len() + self.excluded.len()
    }

    fn exclude(&mut self, triple: EmaPeriodTriple, reason: ExclusionReason) {
        trace!(%triple, ?reason, "triple excluded");
        self.excluded.push(ExcludedTriple { triple, reason });
    }
}

/// Passed to the progress callback after every batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchProgress {
    /// Zero-based index of the batch just finished.
    pub batch_index: usize,
    pub batch_count: usize,
    pub evaluated: usize,
    pub total: usize,
    pub accepted: usize,
}

pub fn search(
    prices: &PriceSeries,
    triples: &[EmaPeriodTriple],
    config: GridSearchConfig,
) -> Result<GridSearchResult, EmaGridError> {
    search_with_progress(prices, triples, config, |_| ControlFlow::Continue(()))
}

/// Like [`search`], reporting after each batch. Returning `Break` stops before
/// the next batch and yields the rows accumulated so far.
pub fn search_with_progress<F>(
    prices: &PriceSeries,
    triples: &[EmaPeriodTriple],
    config: GridSearchConfig,
    mut on_batch: F,
) -> Result<GridSearchResult, EmaGridError>
where
    F: FnMut(&BatchProgress) -> ControlFlow<()>,
{
    config.validate()?;
    let mut result = GridSearchResult::default();
    if triples.is_empty() {
        return Ok(result);
    }
    if prices.is_empty() {
        return Err(EmaGridError::EmptyInput {
            what: "training prices".into(),
        });
    }

    let closes = prices.closes();
    let periods = distinct_periods(triples);
    let cache = EmaCache::build(closes, periods.iter().copied())?;

    let batch_count = triples.len().div_ceil(config.batch_size);
    let years = prices.years_in_sample().max(MIN_YEARS);
    let periods_per_year = config.frequency.periods_per_year();
    info!(
        triples = triples.len(),
        distinct_periods = periods.len(),
        batches = batch_count,
        bars = closes.len(),
        "grid search started"
    );

    for (batch_index, batch) in triples.chunks(config.batch_size).enumerate() {
        let mut columns: Vec<SignalSeries> = Vec::with_capacity(batch.len());
        let mut simulated: Vec<EmaPeriodTriple> = Vec::with_capacity(batch.len());
        for &triple in batch {
            match ema_signals(&cache, &triple) {
                Ok(signals) => {
                    columns.push(signals);
                    simulated.push(triple);
                }
                Err(e) => result.exclude(triple, ExclusionReason::SimulationFailed(e.to_string())),
            }
        }

        let accepted_before = result.rows.len();
        let portfolios = simulate_batch(closes, &columns, &config.execution)?;
        for (triple, outcome) in simulated.into_iter().zip(portfolios) {
            let portfolio = match outcome {
                Ok(portfolio) => portfolio,
                Err(e) => {
                    result.exclude(triple, ExclusionReason::SimulationFailed(e.to_string()));
                    continue;
                }
            };

            let trade_count = portfolio.trade_count();
            let trades_per_year = trade_count as f64 / years;
            if trades_per_year < config.min_trades_per_year {
                result.exclude(triple, ExclusionReason::InsufficientActivity { trades_per_year });
                continue;
            }

            result.rows.push(GridSearchRow {
                triple,
                sharpe_ratio: sharpe_ratio(&portfolio.periodic_returns(), periods_per_year),
                total_return: portfolio.total_return(),
                trade_count,
                trades_per_year,
            });
        }

        let progress = BatchProgress {
            batch_index,
            batch_count,
            evaluated: result.evaluated(),
            total: triples.len(),
            accepted: result.rows.len(),
        };
        debug!(
            batch = batch_index + 1,
            batch_count,
            size = batch.len(),
            accepted = result.rows.len() - accepted_before,
            "batch evaluated"
        );
        if on_batch(&progress).is_break() {
            info!(
                evaluated = progress.evaluated,
                total = progress.total,
                "grid search stopped early"
            );
            return Ok(result);
        }
    }

    info!(
        rows = result.rows.len(),
        excluded = result.excluded.len(),
        "grid search finished"
    );
    Ok(result)
}
