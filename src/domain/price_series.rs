//! Close-price series with a strictly increasing timestamp index.

use chrono::NaiveDateTime;

use super::error::EmaGridError;
use super::ohlcv::OhlcvBar;

const SECONDS_PER_YEAR: f64 = 365.25 * 86_400.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    timestamps: Vec<NaiveDateTime>,
    closes: Vec<f64>,
}

impl PriceSeries {
    /// Validates that timestamps strictly increase and every close is finite and positive.
    pub fn new(timestamps: Vec<NaiveDateTime>, closes: Vec<f64>) -> Result<Self, EmaGridError> {
        if timestamps.len() != closes.len() {
            return Err(EmaGridError::LengthMismatch {
                what: "closes".into(),
                expected: timestamps.len(),
                actual: closes.len(),
            });
        }
        for (i, &close) in closes.iter().enumerate() {
            if !close.is_finite() || close <= 0.0 {
                return Err(EmaGridError::InvalidPriceSeries {
                    index: i,
                    reason: format!("close must be finite and positive, got {close}"),
                });
            }
        }
        for (i, pair) in timestamps.windows(2).enumerate() {
            if pair[1] <= pair[0] {
                return Err(EmaGridError::InvalidPriceSeries {
                    index: i + 1,
                    reason: format!("timestamp {} does not follow {}", pair[1], pair[0]),
                });
            }
        }
        Ok(Self { timestamps, closes })
    }

    pub fn from_bars(bars: &[OhlcvBar]) -> Result<Self, EmaGridError> {
        Self::new(
            bars.iter().map(|b| b.timestamp).collect(),
            bars.iter().map(|b| b.close).collect(),
        )
    }

    pub fn timestamps(&self) -> &[NaiveDateTime] {
        &self.timestamps
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn first_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.first().copied()
    }

    pub fn last_timestamp(&self) -> Option<NaiveDateTime> {
        self.timestamps.last().copied()
    }

    /// First `end` observations. `end` is clamped to the series length.
    pub fn head(&self, end: usize) -> PriceSeries {
        let end = end.min(self.len());
        PriceSeries {
            timestamps: self.timestamps[..end].to_vec(),
            closes: self.closes[..end].to_vec(),
        }
    }

    /// Leading `floor(len * ratio)` observations used for parameter search.
    pub fn training_slice(&self, ratio: f64) -> PriceSeries {
        let split = (self.len() as f64 * ratio).floor() as usize;
        self.head(split)
    }

    /// Calendar span between first and last timestamp, in 365.25-day years.
    pub fn years_in_sample(&self) -> f64 {
        match (self.first_timestamp(), self.last_timestamp()) {
            (Some(first), Some(last)) => (last - first).num_seconds() as f64 / SECONDS_PER_YEAR,
            _ => 0.0,
        }
    }
}
