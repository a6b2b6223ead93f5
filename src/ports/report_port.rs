//! Report generation port.

use std::path::Path;

use crate::domain::backtest::BacktestRun;
use crate::domain::error::TradesimError;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(&self, run: &BacktestRun, output_path: &Path) -> Result<(), TradesimError>;
}
