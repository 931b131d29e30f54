//! Sampling frequency codes and annualization factors.

use std::fmt;
use std::str::FromStr;

use super::error::EmaGridError;

const TRADING_DAYS_PER_YEAR: f64 = 252.0;
const TRADING_HOURS_PER_DAY: f64 = 6.5;
const TRADING_MINUTES_PER_DAY: f64 = 390.0;
const WEEKS_PER_YEAR: f64 = 52.0;
const MONTHS_PER_YEAR: f64 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyUnit {
    Minute,
    Hour,
    Day,
    Week,
    Month,
}

/// Bar spacing such as `1D` or `15min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataFrequency {
    pub multiple: u32,
    pub unit: FrequencyUnit,
}

impl DataFrequency {
    pub const DAILY: DataFrequency = DataFrequency {
        multiple: 1,
        unit: FrequencyUnit::Day,
    };

    /// Number of bars in a trading year.
    pub fn periods_per_year(&self) -> f64 {
        let per_unit = match self.unit {
            FrequencyUnit::Minute => TRADING_DAYS_PER_YEAR * TRADING_MINUTES_PER_DAY,
            FrequencyUnit::Hour => TRADING_DAYS_PER_YEAR * TRADING_HOURS_PER_DAY,
            FrequencyUnit::Day => TRADING_DAYS_PER_YEAR,
            FrequencyUnit::Week => WEEKS_PER_YEAR,
            FrequencyUnit::Month => MONTHS_PER_YEAR,
        };
        per_unit / self.multiple as f64
    }
}

impl Default for DataFrequency {
    fn default() -> Self {
        Self::DAILY
    }
}

impl FromStr for DataFrequency {
    type Err = EmaGridError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || EmaGridError::InvalidFrequency { code: s.to_string() };
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (digits, suffix) = trimmed.split_at(split);
        let multiple = if digits.is_empty() {
            1
        } else {
            digits.parse::<u32>().map_err(|_| invalid())?
        };
        if multiple == 0 {
            return Err(invalid());
        }
        let unit = match suffix {
            "min" | "T" | "m" => FrequencyUnit::Minute,
            other => match other.to_ascii_uppercase().as_str() {
                "H" | "HOUR" => FrequencyUnit::Hour,
                "D" | "DAY" => FrequencyUnit::Day,
                "W" | "WEEK" => FrequencyUnit::Week,
                "M" | "MO" | "MONTH" => FrequencyUnit::Month,
                _ => return Err(invalid()),
            },
        };
        Ok(DataFrequency { multiple, unit })
    }
}

impl fmt::Display for DataFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.unit {
            FrequencyUnit::Minute => "min",
            FrequencyUnit::Hour => "H",
            FrequencyUnit::Day => "D",
            FrequencyUnit::Week => "W",
            FrequencyUnit::Month => "M",
        };
        write!(f, "{}{}", self.multiple, suffix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_is_252() {
        let freq: DataFrequency = "1D".parse().unwrap();
        assert_eq!(freq, DataFrequency::DAILY);
        assert!((freq.periods_per_year() - 252.0).abs() < f64::EPSILON);
    }

    #[test]
    fn bare_unit_defaults_to_one() {
        let freq: DataFrequency = "d".parse().unwrap();
        assert_eq!(freq.multiple, 1);
        assert_eq!(freq.unit, FrequencyUnit::Day);
    }

    #[test]
    fn lowercase_m_is_minute_uppercase_is_month() {
        let minute: DataFrequency = "15m".parse().unwrap();
        let month: DataFrequency = "1M".parse().unwrap();
        assert_eq!(minute.unit, FrequencyUnit::Minute);
        assert_eq!(month.unit, FrequencyUnit::Month);
    }

    #[test]
    fn multi_hour_bars() {
        let freq: DataFrequency = "4H".parse().unwrap();
        assert!((freq.periods_per_year() - 252.0 * 6.5 / 4.0).abs() < 1e-9);
    }

    #[test]
    fn minute_aliases() {
        let a: DataFrequency = "15min".parse().unwrap();
        let b: DataFrequency = "15T".parse().unwrap();
        assert_eq!(a, b);
        assert!((a.periods_per_year() - 252.0 * 26.0).abs() < 1e-9);
    }

    #[test]
    fn weekly_and_monthly() {
        let w: DataFrequency = "1W".parse().unwrap();
        let m: DataFrequency = "1M".parse().unwrap();
        assert!((w.periods_per_year() - 52.0).abs() < f64::EPSILON);
        assert!((m.periods_per_year() - 12.0).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_unknown_and_zero() {
        assert!("1Y".parse::<DataFrequency>().is_err());
        assert!("0D".parse::<DataFrequency>().is_err());
        assert!("12".parse::<DataFrequency>().is_err());
        assert!("".parse::<DataFrequency>().is_err());
    }

    #[test]
    fn display_round_trips_code() {
        assert_eq!(DataFrequency::DAILY.to_string(), "1D");
        let freq: DataFrequency = "30min".parse().unwrap();
        assert_eq!(freq.to_string(), "30min");
    }
}
