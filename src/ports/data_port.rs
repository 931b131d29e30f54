//! Data access port trait.

use crate::domain::error::EmaGridError;
use crate::domain::ohlcv::OhlcvBar;
use chrono::NaiveDateTime;

pub trait DataPort {
    /// Bars for `ticker` sorted by timestamp, optionally limited to an
    /// inclusive time window. An empty result is not an error here.
    fn fetch_ohlcv(
        &self,
        ticker: &str,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<OhlcvBar>, EmaGridError>;
}
