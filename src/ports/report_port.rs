//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BarsmithError;

/// Port for writing backtest reports.
pub trait ReportPort {
    fn write(
        &self,
        result: &BacktestResult,
        strategy_name: &str,
        output_path: &str,
    ) -> Result<(), BarsmithError>;
}
