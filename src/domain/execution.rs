//! Trade execution and fill simulation.
//!
//! Implements all-in long entries and full exits with proportional slippage
//! and proportional fees on notional value.

use super::error::EmaGridError;
use super::portfolio::SimulatedPortfolio;
use super::position::{ClosedTrade, Position};

/// Capital and cost parameters shared by every simulated combination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExecutionConfig {
    pub initial_cash: f64,
    /// Fraction of notional charged on each fill.
    pub fee_rate: f64,
    /// Fractional adverse price move applied to each fill.
    pub slippage_rate: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            initial_cash: 100_000.0,
            fee_rate: 0.0005,
            slippage_rate: 0.0005,
        }
    }
}

impl ExecutionConfig {
    pub fn validate(&self) -> Result<(), EmaGridError> {
        if !self.initial_cash.is_finite() || self.initial_cash <= 0.0 {
            return Err(invalid("initial_cash", "must be finite and positive"));
        }
        if !self.fee_rate.is_finite() || self.fee_rate < 0.0 {
            return Err(invalid("fee_rate", "must be finite and non-negative"));
        }
        if !self.slippage_rate.is_finite() || !(0.0..1.0).contains(&self.slippage_rate) {
            return Err(invalid("slippage_rate", "must be in [0, 1)"));
        }
        Ok(())
    }
}

fn invalid(field: &str, reason: &str) -> EmaGridError {
    EmaGridError::InvalidExecution {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// fee = notional * fee_rate
pub fn calculate_fee(notional: f64, fee_rate: f64) -> f64 {
    notional * fee_rate
}

/// Buy: execution_price = close * (1 + slippage_rate)
pub fn apply_slippage_buy(close: f64, slippage_rate: f64) -> f64 {
    close * (1.0 + slippage_rate)
}

/// Sell: execution_price = close * (1 - slippage_rate)
pub fn apply_slippage_sell(close: f64, slippage_rate: f64) -> f64 {
    close * (1.0 - slippage_rate)
}

#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum EntryResult {
    Entered {
        units: f64,
        execution_price: f64,
        notional: f64,
        fee: f64,
    },
    AlreadyLong,
    InsufficientCapital,
}

/// Invest the whole cash balance.
///
/// The balance pays notional + fee, so notional = cash / (1 + fee_rate) and the
/// account is left with zero cash.
pub fn enter_long(
    portfolio: &mut SimulatedPortfolio,
    index: usize,
    close: f64,
    config: &ExecutionConfig,
) -> EntryResult {
    if portfolio.is_long() {
        return EntryResult::AlreadyLong;
    }
    let cash = portfolio.cash;
    if cash <= 0.0 {
        return EntryResult::InsufficientCapital;
    }

    let execution_price = apply_slippage_buy(close, config.slippage_rate);
    let notional = cash / (1.0 + config.fee_rate);
    let fee = cash - notional;
    let units = notional / execution_price;

    portfolio.cash = 0.0;
    portfolio.position = Some(Position {
        entry_index: index,
        units,
        entry_price: execution_price,
        entry_cost: cash,
    });

    EntryResult::Entered {
        units,
        execution_price,
        notional,
        fee,
    }
}

#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub struct ExitResult {
    pub units: f64,
    pub exit_price: f64,
    pub notional: f64,
    pub fee: f64,
    pub trade_return: f64,
}

/// Sell the entire position and record the closed trade. `None` when flat.
#[must_use]
pub fn exit_long(
    portfolio: &mut SimulatedPortfolio,
    index: usize,
    close: f64,
    config: &ExecutionConfig,
) -> Option<ExitResult> {
    let position = portfolio.position.take()?;

    let exit_price = apply_slippage_sell(close, config.slippage_rate);
    let notional = position.units * exit_price;
    let fee = calculate_fee(notional, config.fee_rate);
    let proceeds = notional - fee;

    portfolio.cash += proceeds;

    let trade = ClosedTrade {
        entry_index: position.entry_index,
        exit_index: index,
        units: position.units,
        entry_price: position.entry_price,
        exit_price,
        entry_cost: position.entry_cost,
        exit_proceeds: proceeds,
    };
    let trade_return = trade.return_pct();
    portfolio.record_trade(trade);

    Some(ExitResult {
        units: position.units,
        exit_price,
        notional,
        fee,
        trade_return,
    })
}
