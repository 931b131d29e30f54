//! Report generation port trait.

use std::path::Path;

use crate::domain::backtest::StrategyReport;
use crate::domain::error::EmaGridError;

/// Port for writing the winning strategy's report.
pub trait ReportPort {
    fn write(&self, report: &StrategyReport, output_path: &Path) -> Result<(), EmaGridError>;
}
