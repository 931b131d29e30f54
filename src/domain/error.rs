//! Domain error types.

/// Top-level error type for emagrid.
#[derive(Debug, thiserror::Error)]
pub enum EmaGridError {
    #[error("invalid EMA period {period}: periods must be positive integers")]
    InvalidPeriod { period: i64 },

    #[error("empty search space: {reason}")]
    EmptySearchSpace { reason: String },

    #[error("empty input: {what} has zero length")]
    EmptyInput { what: String },

    #[error("length mismatch: {what} has {actual} values, expected {expected}")]
    LengthMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid execution parameter {field}: {reason}")]
    InvalidExecution { field: String, reason: String },

    #[error("invalid price series at index {index}: {reason}")]
    InvalidPriceSeries { index: usize, reason: String },

    #[error("invalid data frequency '{code}'")]
    InvalidFrequency { code: String },

    #[error("unknown ranking metric '{name}'")]
    UnknownMetric { name: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data format error: {reason}")]
    DataFormat { reason: String },

    #[error("no data for {ticker}")]
    NoData { ticker: String },

    #[error("insufficient data for {ticker}: have {bars} bars, need {minimum}")]
    InsufficientData {
        ticker: String,
        bars: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&EmaGridError> for std::process::ExitCode {
    fn from(err: &EmaGridError) -> Self {
        let code: u8 = match err {
            EmaGridError::Io(_) => 1,
            EmaGridError::ConfigParse { .. }
            | EmaGridError::ConfigMissing { .. }
            | EmaGridError::ConfigInvalid { .. }
            | EmaGridError::InvalidPeriod { .. }
            | EmaGridError::InvalidFrequency { .. } => 2,
            EmaGridError::DataFormat { .. }
            | EmaGridError::NoData { .. }
            | EmaGridError::InsufficientData { .. }
            | EmaGridError::InvalidPriceSeries { .. } => 3,
            EmaGridError::EmptySearchSpace { .. } | EmaGridError::UnknownMetric { .. } => 4,
            EmaGridError::EmptyInput { .. }
            | EmaGridError::LengthMismatch { .. }
            | EmaGridError::InvalidExecution { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = EmaGridError::LengthMismatch {
            what: "entries".into(),
            expected: 10,
            actual: 9,
        };
        assert_eq!(
            err.to_string(),
            "length mismatch: entries has 9 values, expected 10"
        );
    }

    #[test]
    fn invalid_period_message() {
        let err = EmaGridError::InvalidPeriod { period: -3 };
        assert!(err.to_string().contains("-3"));
    }

    #[test]
    fn config_missing_message() {
        let err = EmaGridError::ConfigMissing {
            section: "grid".into(),
            key: "fast_ema_periods".into(),
        };
        assert_eq!(err.to_string(), "missing config key [grid] fast_ema_periods");
    }
}
