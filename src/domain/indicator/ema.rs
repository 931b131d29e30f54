//! Exponential Moving Average.
//!
//! k = 2/(n+1), seed with the first close, then EMA[i] = EMA[i-1] + k*(C[i] - EMA[i-1]).
//! Warmup: first (n-1) bars are NaN even though the recursion runs from bar 0.

use crate::domain::error::EmaGridError;
use crate::domain::indicator::EmaSeries;

pub fn calculate_ema(closes: &[f64], period: usize) -> Result<EmaSeries, EmaGridError> {
    if period == 0 {
        return Err(EmaGridError::InvalidPeriod { period: 0 });
    }

    let mut values = Vec::with_capacity(closes.len());
    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        if i == 0 {
            ema = close;
        } else {
            // increment form keeps a constant input exactly constant
            ema += k * (close - ema);
        }

        if i < period - 1 {
            values.push(f64::NAN);
        } else {
            values.push(ema);
        }
    }

    Ok(EmaSeries { period, values })
}
