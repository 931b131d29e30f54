//! Crossover entry/exit signals with next-bar execution.
//!
//! A raw condition observed at bar t becomes a signal at bar t+1, so the bit
//! at index t only depends on EMA values at indices <= t-1.

use super::combination::EmaPeriodTriple;
use super::error::EmaGridError;
use super::indicator::ema_cache::EmaCache;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SignalSeries {
    pub entries: Vec<bool>,
    pub exits: Vec<bool>,
}

impl SignalSeries {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry_count(&self) -> usize {
        self.entries.iter().filter(|&&b| b).count()
    }

    pub fn exit_count(&self) -> usize {
        self.exits.iter().filter(|&&b| b).count()
    }

    pub fn entry_indices(&self) -> Vec<usize> {
        true_indices(&self.entries)
    }

    pub fn exit_indices(&self) -> Vec<usize> {
        true_indices(&self.exits)
    }
}

fn true_indices(bits: &[bool]) -> Vec<usize> {
    bits.iter()
        .enumerate()
        .filter_map(|(i, &b)| b.then_some(i))
        .collect()
}

/// `a` moves from at-or-below `b` to strictly above it at bar `i`.
fn crossed_above(a: &[f64], b: &[f64], i: usize) -> bool {
    if i == 0 {
        return false;
    }
    a[i] > b[i] && a[i - 1] <= b[i - 1]
}

/// `a` moves from at-or-above `b` to strictly below it at bar `i`.
fn crossed_below(a: &[f64], b: &[f64], i: usize) -> bool {
    if i == 0 {
        return false;
    }
    a[i] < b[i] && a[i - 1] >= b[i - 1]
}

/// Shift forward one bar; index 0 has no prior observation and stays false.
fn shift_forward(raw: &[bool]) -> Vec<bool> {
    let mut shifted = Vec::with_capacity(raw.len());
    if !raw.is_empty() {
        shifted.push(false);
        shifted.extend_from_slice(&raw[..raw.len() - 1]);
    }
    shifted
}

pub fn build_signals(fast: &[f64], medium: &[f64], slow: &[f64]) -> Result<SignalSeries, EmaGridError> {
    let n = fast.len();
    for (what, series) in [("medium EMA", medium), ("slow EMA", slow)] {
        if series.len() != n {
            return Err(EmaGridError::LengthMismatch {
                what: what.into(),
                expected: n,
                actual: series.len(),
            });
        }
    }

    // a bar is only tradable once all three EMAs are defined on it and the bar before
    let defined = |i: usize| {
        i > 0
            && [fast, medium, slow]
                .iter()
                .all(|s| !s[i].is_nan() && !s[i - 1].is_nan())
    };
    let pairs = [(fast, medium), (fast, slow), (medium, slow)];
    let raw_entries: Vec<bool> = (0..n)
        .map(|i| defined(i) && pairs.iter().any(|(a, b)| crossed_above(a, b, i)))
        .collect();
    let raw_exits: Vec<bool> = (0..n)
        .map(|i| defined(i) && pairs.iter().any(|(a, b)| crossed_below(a, b, i)))
        .collect();

    Ok(SignalSeries {
        entries: shift_forward(&raw_entries),
        exits: shift_forward(&raw_exits),
    })
}

/// Signals for one triple using series already held by the cache.
pub fn ema_signals(cache: &EmaCache, triple: &EmaPeriodTriple) -> Result<SignalSeries, EmaGridError> {
    let fast = cache.require(triple.fast())?;
    let medium = cache.require(triple.medium())?;
    let slow = cache.require(triple.slow())?;
    build_signals(&fast.values, &medium.values, &slow.values)
}
