//! Moving-average indicators used by the crossover strategy.
//!
//! - `EmaSeries`: EMA values aligned to a close series, `NaN` during warm-up
//! - [`ema`]: the recursive EMA calculation
//! - [`ema_cache`]: one EMA per distinct period, shared across a grid search

pub mod ema;
pub mod ema_cache;

#[derive(Debug, Clone, PartialEq)]
pub struct EmaSeries {
    pub period: usize,
    pub values: Vec<f64>,
}

impl EmaSeries {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Index of the first defined value, if the series ever leaves warm-up.
    pub fn first_valid_index(&self) -> Option<usize> {
        self.values.iter().position(|v| !v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_valid_index_skips_warmup() {
        let series = EmaSeries {
            period: 3,
            values: vec![f64::NAN, f64::NAN, 2.0, 3.0],
        };
        assert_eq!(series.first_valid_index(), Some(2));
    }

    #[test]
    fn first_valid_index_none_when_all_nan() {
        let series = EmaSeries {
            period: 10,
            values: vec![f64::NAN; 4],
        };
        assert_eq!(series.first_valid_index(), None);
        assert_eq!(series.len(), 4);
    }
}
