//! Performance metrics and statistics.
//!
//! Every value is either finite or NaN. Undefined ratios (zero volatility,
//! zero trades, too few bars) are NaN rather than 0 or infinity.

use std::collections::BTreeMap;

use super::frequency::DataFrequency;
use super::portfolio::SimulatedPortfolio;

/// Standard deviations below this are treated as zero volatility.
pub const VOLATILITY_EPSILON: f64 = 1e-12;

pub const METRIC_NAMES: [&str; 6] = [
    "total_return",
    "annualized_return",
    "sharpe_ratio",
    "maximum_drawdown",
    "volatility",
    "win_rate",
];

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    pub sharpe_ratio: f64,
    pub maximum_drawdown: f64,
    pub volatility: f64,
    pub win_rate: f64,
    pub total_trades: usize,
}

impl PerformanceMetrics {
    pub fn compute(portfolio: &SimulatedPortfolio, frequency: DataFrequency) -> Self {
        let periods_per_year = frequency.periods_per_year();
        let returns = portfolio.periodic_returns();

        let total_return = finite_or_nan(portfolio.total_return());
        let annualized_return = annualize(total_return, portfolio.bar_count(), periods_per_year);
        let sharpe_ratio = sharpe_ratio(&returns, periods_per_year);
        let maximum_drawdown = max_drawdown(&portfolio.equity_curve);
        let volatility = sample_std(&returns)
            .map(|std| finite_or_nan(std * periods_per_year.sqrt()))
            .unwrap_or(f64::NAN);

        let total_trades = portfolio.trade_count();
        let wins = portfolio.closed_trades.iter().filter(|t| t.is_win()).count();
        let win_rate = if total_trades > 0 {
            wins as f64 / total_trades as f64
        } else {
            f64::NAN
        };

        PerformanceMetrics {
            total_return,
            annualized_return,
            sharpe_ratio,
            maximum_drawdown,
            volatility,
            win_rate,
            total_trades,
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "total_return" => Some(self.total_return),
            "annualized_return" => Some(self.annualized_return),
            "sharpe_ratio" => Some(self.sharpe_ratio),
            "maximum_drawdown" => Some(self.maximum_drawdown),
            "volatility" => Some(self.volatility),
            "win_rate" => Some(self.win_rate),
            _ => None,
        }
    }

    /// Metric name → value, in the naming used by the report collaborator.
    pub fn as_map(&self) -> BTreeMap<&'static str, f64> {
        METRIC_NAMES
            .iter()
            .filter_map(|&name| self.get(name).map(|v| (name, v)))
            .collect()
    }
}

fn finite_or_nan(value: f64) -> f64 {
    if value.is_finite() { value } else { f64::NAN }
}

fn annualize(total_return: f64, bars: usize, periods_per_year: f64) -> f64 {
    if bars == 0 || total_return.is_nan() {
        return f64::NAN;
    }
    let exponent = periods_per_year / bars as f64;
    finite_or_nan((1.0 + total_return).powf(exponent) - 1.0)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator); `None` below two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let m = mean(values)?;
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    Some(variance.sqrt())
}

/// mean / std * sqrt(periods_per_year); NaN when volatility is (near) zero.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    let (Some(m), Some(std)) = (mean(returns), sample_std(returns)) else {
        return f64::NAN;
    };
    if std.is_nan() || std < VOLATILITY_EPSILON {
        return f64::NAN;
    }
    finite_or_nan(m / std * periods_per_year.sqrt())
}

/// Largest peak-to-trough decline as a positive fraction of the peak.
pub fn max_drawdown(equity_curve: &[f64]) -> f64 {
    let Some(&first) = equity_curve.first() else {
        return f64::NAN;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &equity in equity_curve {
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }
    finite_or_nan(max_dd)
}
