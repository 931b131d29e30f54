//! Long-only signal-driven portfolio simulation.
//!
//! Each bar is processed as: exit (if long and the exit bit is set), then
//! entry (if flat and the entry bit is set), then mark-to-market at the close.
//! A bar carrying both bits therefore closes an open position and re-enters
//! at the same close. A position still open after the last bar is marked but
//! never recorded as a closed trade.

use tracing::{debug, trace};

use super::error::EmaGridError;
use super::execution::{enter_long, exit_long, EntryResult, ExecutionConfig};
use super::portfolio::SimulatedPortfolio;
use super::signal::SignalSeries;

fn check_close(close: &[f64]) -> Result<(), EmaGridError> {
    if close.is_empty() {
        return Err(EmaGridError::EmptyInput {
            what: "close".into(),
        });
    }
    Ok(())
}

fn check_lengths(close: &[f64], entries: &[bool], exits: &[bool]) -> Result<(), EmaGridError> {
    for (what, len) in [("entries", entries.len()), ("exits", exits.len())] {
        if len != close.len() {
            return Err(EmaGridError::LengthMismatch {
                what: what.into(),
                expected: close.len(),
                actual: len,
            });
        }
    }
    Ok(())
}

fn run(close: &[f64], entries: &[bool], exits: &[bool], config: &ExecutionConfig) -> SimulatedPortfolio {
    let mut portfolio = SimulatedPortfolio::with_capacity(config.initial_cash, close.len());
    for (i, &price) in close.iter().enumerate() {
        if exits[i] {
            if let Some(exit) = exit_long(&mut portfolio, i, price, config) {
                trace!(bar = i, price = exit.exit_price, fee = exit.fee, trade_return = exit.trade_return, "exit");
            }
        }
        if entries[i] {
            match enter_long(&mut portfolio, i, price, config) {
                EntryResult::Entered {
                    units,
                    execution_price,
                    fee,
                    ..
                } => trace!(bar = i, units, price = execution_price, fee, "entry"),
                EntryResult::InsufficientCapital => {
                    debug!(bar = i, cash = portfolio.cash, "entry skipped, no cash")
                }
                EntryResult::AlreadyLong => {}
            }
        }
        portfolio.record_bar(price);
    }
    portfolio
}

pub fn simulate(
    close: &[f64],
    entries: &[bool],
    exits: &[bool],
    config: &ExecutionConfig,
) -> Result<SimulatedPortfolio, EmaGridError> {
    check_close(close)?;
    check_lengths(close, entries, exits)?;
    config.validate()?;
    Ok(run(close, entries, exits, config))
}

/// Simulate many signal columns over one close series.
///
/// Input-wide problems (empty close, bad config) fail the whole batch; a
/// column with the wrong length only fails its own slot.
pub fn simulate_batch(
    close: &[f64],
    columns: &[SignalSeries],
    config: &ExecutionConfig,
) -> Result<Vec<Result<SimulatedPortfolio, EmaGridError>>, EmaGridError> {
    check_close(close)?;
    config.validate()?;
    Ok(columns
        .iter()
        .map(|signals| {
            check_lengths(close, &signals.entries, &signals.exits)?;
            Ok(run(close, &signals.entries, &signals.exits, config))
        })
        .collect())
}
