//! EMA values keyed by period, computed once per distinct period.

use std::collections::{BTreeSet, HashMap};

use super::ema::calculate_ema;
use super::EmaSeries;
use crate::domain::error::EmaGridError;

/// Source of EMA series. The cache calls it exactly once per distinct period.
pub trait EmaCalculator {
    fn calculate(&self, closes: &[f64], period: usize) -> Result<EmaSeries, EmaGridError>;
}

/// First-value-seeded recursive EMA from [`calculate_ema`].
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEma;

impl EmaCalculator for StandardEma {
    fn calculate(&self, closes: &[f64], period: usize) -> Result<EmaSeries, EmaGridError> {
        calculate_ema(closes, period)
    }
}

#[derive(Debug, Clone, Default)]
pub struct EmaCache {
    series: HashMap<usize, EmaSeries>,
    source_len: usize,
}

impl EmaCache {
    pub fn build<I>(closes: &[f64], periods: I) -> Result<Self, EmaGridError>
    where
        I: IntoIterator<Item = usize>,
    {
        Self::build_with(&StandardEma, closes, periods)
    }

    /// All periods are validated before any series is computed.
    pub fn build_with<C, I>(calculator: &C, closes: &[f64], periods: I) -> Result<Self, EmaGridError>
    where
        C: EmaCalculator + ?Sized,
        I: IntoIterator<Item = usize>,
    {
        let distinct: BTreeSet<usize> = periods.into_iter().collect();
        if distinct.contains(&0) {
            return Err(EmaGridError::InvalidPeriod { period: 0 });
        }

        let mut series = HashMap::with_capacity(distinct.len());
        for period in distinct {
            series.insert(period, calculator.calculate(closes, period)?);
        }

        Ok(Self {
            series,
            source_len: closes.len(),
        })
    }

    pub fn get(&self, period: usize) -> Option<&EmaSeries> {
        self.series.get(&period)
    }

    /// Like [`get`](Self::get) but a missing period is an error.
    pub fn require(&self, period: usize) -> Result<&EmaSeries, EmaGridError> {
        self.series.get(&period).ok_or(EmaGridError::InvalidPeriod {
            period: period as i64,
        })
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn periods(&self) -> BTreeSet<usize> {
        self.series.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct CountingEma {
        calls: RefCell<Vec<usize>>,
    }

    impl EmaCalculator for CountingEma {
        fn calculate(&self, closes: &[f64], period: usize) -> Result<EmaSeries, EmaGridError> {
            self.calls.borrow_mut().push(period);
            calculate_ema(closes, period)
        }
    }

    fn closes() -> Vec<f64> {
        (0..50).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn one_computation_per_distinct_period() {
        let calc = CountingEma {
            calls: RefCell::new(Vec::new()),
        };
        let periods = vec![5, 20, 5, 50, 20, 5];
        let cache = EmaCache::build_with(&calc, &closes(), periods).unwrap();

        assert_eq!(cache.len(), 3);
        assert_eq!(*calc.calls.borrow(), vec![5, 20, 50]);
    }

    #[test]
    fn cached_series_matches_direct_calculation() {
        let data = closes();
        let cache = EmaCache::build(&data, [7, 12]).unwrap();
        let direct = calculate_ema(&data, 12).unwrap();

        let cached = cache.get(12).unwrap();
        assert_eq!(cached.period, direct.period);
        assert_eq!(cached.values.len(), direct.values.len());
        for (a, b) in cached.values.iter().zip(&direct.values) {
            assert!(a.total_cmp(b).is_eq(), "{a} != {b}");
        }
        assert_eq!(cached.first_valid_index(), Some(11));
        assert_eq!(cache.source_len(), 50);
    }

    #[test]
    fn zero_period_fails_before_computing() {
        let calc = CountingEma {
            calls: RefCell::new(Vec::new()),
        };
        let result = EmaCache::build_with(&calc, &closes(), [3, 0, 9]);

        assert!(matches!(result, Err(EmaGridError::InvalidPeriod { period: 0 })));
        assert!(calc.calls.borrow().is_empty());
    }

    #[test]
    fn require_missing_period_is_error() {
        let cache = EmaCache::build(&closes(), [3]).unwrap();
        assert!(cache.require(3).is_ok());
        assert!(matches!(
            cache.require(4),
            Err(EmaGridError::InvalidPeriod { period: 4 })
        ));
    }

    #[test]
    fn empty_period_set_builds_empty_cache() {
        let cache = EmaCache::build(&closes(), std::iter::empty()).unwrap();
        assert!(cache.is_empty());
        assert!(cache.periods().is_empty());
    }
}
