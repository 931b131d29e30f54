//! Best-row selection over grid search results.

use std::fmt;
use std::str::FromStr;

use super::error::EmaGridError;
use super::grid_search::{GridSearchResult, GridSearchRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankMetric {
    #[default]
    SharpeRatio,
    TotalReturn,
    TradesPerYear,
}

impl RankMetric {
    pub fn name(&self) -> &'static str {
        match self {
            RankMetric::SharpeRatio => "sharpe_ratio",
            RankMetric::TotalReturn => "total_return",
            RankMetric::TradesPerYear => "trades_per_year",
        }
    }

    pub fn value(&self, row: &GridSearchRow) -> f64 {
        match self {
            RankMetric::SharpeRatio => row.sharpe_ratio,
            RankMetric::TotalReturn => row.total_return,
            RankMetric::TradesPerYear => row.trades_per_year,
        }
    }
}

impl FromStr for RankMetric {
    type Err = EmaGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "sharpe_ratio" => Ok(RankMetric::SharpeRatio),
            "total_return" => Ok(RankMetric::TotalReturn),
            "trades_per_year" => Ok(RankMetric::TradesPerYear),
            other => Err(EmaGridError::UnknownMetric {
                name: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for RankMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn select_best<'a>(
    results: &'a GridSearchResult,
    metric_name: &str,
) -> Result<&'a GridSearchRow, EmaGridError> {
    let metric: RankMetric = metric_name.parse()?;
    select_by(results, metric)
}

/// First row holding the largest value. NaN never beats a number; if every
/// value is NaN the first row is returned.
pub fn select_by(
    results: &GridSearchResult,
    metric: RankMetric,
) -> Result<&GridSearchRow, EmaGridError> {
    let first = results.rows.first().ok_or_else(|| EmaGridError::EmptySearchSpace {
        reason: "no combination survived the grid search".into(),
    })?;

    let mut best = first;
    let mut best_value = metric.value(first);
    for row in &results.rows[1..] {
        let value = metric.value(row);
        if value.is_nan() {
            continue;
        }
        if best_value.is_nan() || value > best_value {
            best = row;
            best_value = value;
        }
    }
    Ok(best)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::combination::EmaPeriodTriple;

    fn row(fast: usize, sharpe: f64, total_return: f64) -> GridSearchRow {
        GridSearchRow {
            triple: EmaPeriodTriple::new(fast, 50, 100).unwrap(),
            sharpe_ratio: sharpe,
            total_return,
            trade_count: 4,
            trades_per_year: fast as f64,
        }
    }

    fn results(rows: Vec<GridSearchRow>) -> GridSearchResult {
        GridSearchResult {
            rows,
            excluded: vec![],
        }
    }

    #[test]
    fn parses_known_metrics() {
        assert_eq!("sharpe_ratio".parse::<RankMetric>().unwrap(), RankMetric::SharpeRatio);
        assert_eq!("total_return".parse::<RankMetric>().unwrap(), RankMetric::TotalReturn);
        assert_eq!(
            " trades_per_year ".parse::<RankMetric>().unwrap(),
            RankMetric::TradesPerYear
        );
        assert_eq!(RankMetric::default().to_string(), "sharpe_ratio");
    }

    #[test]
    fn empty_results_is_error() {
        let err = select_best(&results(vec![]), "sharpe_ratio").unwrap_err();
        assert!(matches!(err, EmaGridError::EmptySearchSpace { .. }));
    }

    #[test]
    fn unknown_metric_is_error() {
        let err = select_best(&results(vec![row(5, 1.0, 0.1)]), "sortino").unwrap_err();
        assert!(matches!(err, EmaGridError::UnknownMetric { ref name } if name == "sortino"));
    }

    #[test]
    fn picks_maximum() {
        let r = results(vec![row(5, 0.5, 0.3), row(6, 1.5, 0.1), row(7, 1.0, 0.2)]);
        assert_eq!(select_best(&r, "sharpe_ratio").unwrap().triple.fast(), 6);
        assert_eq!(select_best(&r, "total_return").unwrap().triple.fast(), 5);
        assert_eq!(select_best(&r, "trades_per_year").unwrap().triple.fast(), 7);
    }

    #[test]
    fn ties_keep_first_row() {
        let r = results(vec![row(5, 1.0, 0.0), row(6, 2.0, 0.0), row(7, 2.0, 0.0)]);
        assert_eq!(select_best(&r, "sharpe_ratio").unwrap().triple.fast(), 6);
    }

    #[test]
    fn nan_never_wins() {
        let r = results(vec![row(5, f64::NAN, 0.0), row(6, -3.0, 0.0), row(7, f64::NAN, 0.0)]);
        assert_eq!(select_best(&r, "sharpe_ratio").unwrap().triple.fast(), 6);
    }

    #[test]
    fn all_nan_returns_first() {
        let r = results(vec![row(5, f64::NAN, 0.0), row(6, f64::NAN, 0.0)]);
        assert_eq!(select_best(&r, "sharpe_ratio").unwrap().triple.fast(), 5);
    }
}
