//! EMA period triples and the combination enumerator.

use std::collections::BTreeSet;
use std::fmt;

use super::error::EmaGridError;

/// `(fast, medium, slow)` periods with `fast < medium` and `fast < slow`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EmaPeriodTriple {
    fast: usize,
    medium: usize,
    slow: usize,
}

impl EmaPeriodTriple {
    pub fn new(fast: usize, medium: usize, slow: usize) -> Result<Self, EmaGridError> {
        for period in [fast, medium, slow] {
            if period == 0 {
                return Err(EmaGridError::InvalidPeriod { period: 0 });
            }
        }
        if fast >= medium || fast >= slow {
            return Err(EmaGridError::InvalidPeriod {
                period: fast as i64,
            });
        }
        Ok(Self { fast, medium, slow })
    }

    pub fn fast(&self) -> usize {
        self.fast
    }

    pub fn medium(&self) -> usize {
        self.medium
    }

    pub fn slow(&self) -> usize {
        self.slow
    }

    /// Longest period; the strategy cannot signal before this many bars.
    pub fn max_period(&self) -> usize {
        self.medium.max(self.slow)
    }

    pub fn periods(&self) -> [usize; 3] {
        [self.fast, self.medium, self.slow]
    }
}

impl fmt::Display for EmaPeriodTriple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EMA({}/{}/{})", self.fast, self.medium, self.slow)
    }
}

/// Every valid triple from the cartesian product, in fast → medium → slow order.
pub fn build_combinations(
    fast_periods: &[usize],
    medium_periods: &[usize],
    slow_periods: &[usize],
) -> Vec<EmaPeriodTriple> {
    let mut combinations = Vec::new();
    for &fast in fast_periods {
        for &medium in medium_periods {
            for &slow in slow_periods {
                if let Ok(triple) = EmaPeriodTriple::new(fast, medium, slow) {
                    combinations.push(triple);
                }
            }
        }
    }
    combinations
}

pub fn distinct_periods(triples: &[EmaPeriodTriple]) -> BTreeSet<usize> {
    triples.iter().flat_map(|t| t.periods()).collect()
}
