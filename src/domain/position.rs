//! Open position and closed trade records.

#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_index: usize,
    pub units: f64,
    /// Fill price after slippage.
    pub entry_price: f64,
    /// Cash spent: notional plus fee.
    pub entry_cost: f64,
}

impl Position {
    pub fn market_value(&self, price: f64) -> f64 {
        self.units * price
    }

    pub fn unrealized_return(&self, price: f64) -> f64 {
        (self.market_value(price) - self.entry_cost) / self.entry_cost
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClosedTrade {
    pub entry_index: usize,
    pub exit_index: usize,
    pub units: f64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_cost: f64,
    /// Cash received: notional minus fee.
    pub exit_proceeds: f64,
}

impl ClosedTrade {
    /// (exit proceeds - entry cost) / entry cost
    pub fn return_pct(&self) -> f64 {
        (self.exit_proceeds - self.entry_cost) / self.entry_cost
    }

    pub fn pnl(&self) -> f64 {
        self.exit_proceeds - self.entry_cost
    }

    pub fn is_win(&self) -> bool {
        self.pnl() > 0.0
    }

    pub fn bars_held(&self) -> usize {
        self.exit_index - self.entry_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_trade(exit_proceeds: f64) -> ClosedTrade {
        ClosedTrade {
            entry_index: 3,
            exit_index: 10,
            units: 100.0,
            entry_price: 50.0,
            exit_price: 55.0,
            entry_cost: 5_000.0,
            exit_proceeds,
        }
    }

    #[test]
    fn market_value_and_unrealized_return() {
        let pos = Position {
            entry_index: 0,
            units: 100.0,
            entry_price: 50.0,
            entry_cost: 5_000.0,
        };
        assert!((pos.market_value(55.0) - 5_500.0).abs() < f64::EPSILON);
        assert!((pos.unrealized_return(55.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn winning_trade() {
        let trade = sample_trade(5_500.0);
        assert!((trade.return_pct() - 0.1).abs() < 1e-12);
        assert!((trade.pnl() - 500.0).abs() < f64::EPSILON);
        assert!(trade.is_win());
        assert_eq!(trade.bars_held(), 7);
    }

    #[test]
    fn breakeven_is_not_a_win() {
        let trade = sample_trade(5_000.0);
        assert!(!trade.is_win());
        assert_eq!(trade.return_pct(), 0.0);
    }

    #[test]
    fn losing_trade() {
        let trade = sample_trade(4_500.0);
        assert!((trade.return_pct() - (-0.1)).abs() < 1e-12);
        assert!(!trade.is_win());
    }
}
