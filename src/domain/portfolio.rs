//! Cash + position account and its per-bar trajectories.

use super::position::{ClosedTrade, Position};

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedPortfolio {
    pub initial_cash: f64,
    pub cash: f64,
    pub position: Option<Position>,
    pub closed_trades: Vec<ClosedTrade>,
    /// Cash balance after each bar.
    pub cash_curve: Vec<f64>,
    /// Units held after each bar.
    pub position_curve: Vec<f64>,
    /// Cash plus position marked at the bar's close.
    pub equity_curve: Vec<f64>,
}

impl SimulatedPortfolio {
    pub fn new(initial_cash: f64) -> Self {
        SimulatedPortfolio {
            initial_cash,
            cash: initial_cash,
            position: None,
            closed_trades: Vec::new(),
            cash_curve: Vec::new(),
            position_curve: Vec::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn with_capacity(initial_cash: f64, bars: usize) -> Self {
        SimulatedPortfolio {
            cash_curve: Vec::with_capacity(bars),
            position_curve: Vec::with_capacity(bars),
            equity_curve: Vec::with_capacity(bars),
            ..Self::new(initial_cash)
        }
    }

    pub fn is_long(&self) -> bool {
        self.position.is_some()
    }

    pub fn units(&self) -> f64 {
        self.position.as_ref().map_or(0.0, |p| p.units)
    }

    pub fn equity(&self, price: f64) -> f64 {
        self.cash + self.position.as_ref().map_or(0.0, |p| p.market_value(price))
    }

    pub fn record_trade(&mut self, trade: ClosedTrade) {
        self.closed_trades.push(trade);
    }

    /// Appends the end-of-bar state marked at `close`.
    pub fn record_bar(&mut self, close: f64) {
        self.cash_curve.push(self.cash);
        self.position_curve.push(self.units());
        self.equity_curve.push(self.equity(close));
    }

    pub fn bar_count(&self) -> usize {
        self.equity_curve.len()
    }

    pub fn trade_count(&self) -> usize {
        self.closed_trades.len()
    }

    pub fn final_equity(&self) -> f64 {
        self.equity_curve.last().copied().unwrap_or(self.initial_cash)
    }

    pub fn total_return(&self) -> f64 {
        self.final_equity() / self.initial_cash - 1.0
    }

    /// Per-bar simple returns; the first bar is measured against initial cash.
    pub fn periodic_returns(&self) -> Vec<f64> {
        let mut returns = Vec::with_capacity(self.equity_curve.len());
        let mut prev = self.initial_cash;
        for &equity in &self.equity_curve {
            returns.push(if prev > 0.0 { equity / prev - 1.0 } else { 0.0 });
            prev = equity;
        }
        returns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_position(units: f64) -> Position {
        Position {
            entry_index: 0,
            units,
            entry_price: 100.0,
            entry_cost: units * 100.0,
        }
    }

    #[test]
    fn new_portfolio() {
        let portfolio = SimulatedPortfolio::new(100_000.0);
        assert!((portfolio.cash - 100_000.0).abs() < f64::EPSILON);
        assert!(!portfolio.is_long());
        assert!(portfolio.closed_trades.is_empty());
        assert!(portfolio.equity_curve.is_empty());
        assert_eq!(portfolio.final_equity(), 100_000.0);
        assert_eq!(portfolio.total_return(), 0.0);
    }

    #[test]
    fn record_bar_marks_to_market() {
        let mut portfolio = SimulatedPortfolio::new(1_000.0);
        portfolio.cash = 0.0;
        portfolio.position = Some(sample_position(10.0));

        portfolio.record_bar(110.0);

        assert_eq!(portfolio.cash_curve, vec![0.0]);
        assert_eq!(portfolio.position_curve, vec![10.0]);
        assert!((portfolio.equity_curve[0] - 1_100.0).abs() < f64::EPSILON);
        assert!((portfolio.total_return() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn periodic_returns_start_from_initial_cash() {
        let mut portfolio = SimulatedPortfolio::new(100.0);
        portfolio.equity_curve = vec![110.0, 99.0, 99.0];
        let returns = portfolio.periodic_returns();
        assert_eq!(returns.len(), 3);
        assert!((returns[0] - 0.1).abs() < 1e-12);
        assert!((returns[1] - (-0.1)).abs() < 1e-12);
        assert_eq!(returns[2], 0.0);
    }

    #[test]
    fn flat_equity_is_cash() {
        let portfolio = SimulatedPortfolio::new(500.0);
        assert_eq!(portfolio.equity(123.0), 500.0);
        assert_eq!(portfolio.units(), 0.0);
    }
}
