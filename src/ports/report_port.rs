//! Report generation port trait.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ReversionError;

/// Port for writing backtest results.
pub trait ReportPort {
    fn write(&self, result: &BacktestResult) -> Result<(), ReversionError>;
}
