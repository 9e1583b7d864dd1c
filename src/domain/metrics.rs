//! Performance summary: final value, CAGR and maximum drawdown.

use super::error::ReversionError;
use super::portfolio::WealthSeries;

pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSummary {
    pub final_value: f64,
    pub cagr: f64,
    /// Most negative `value / running_peak - 1`; never positive.
    pub max_drawdown: f64,
    pub years: f64,
    pub periods: usize,
}

impl PerformanceSummary {
    pub fn compute(wealth: &WealthSeries) -> Result<Self, ReversionError> {
        let values = wealth.values();
        let final_value = *values
            .last()
            .ok_or_else(|| ReversionError::domain("wealth series is empty"))?;

        let periods = values.len();
        let years = periods as f64 / TRADING_DAYS_PER_YEAR;
        let cagr = compute_cagr(final_value, years)?;
        let max_drawdown = compute_max_drawdown(&values);

        Ok(PerformanceSummary {
            final_value,
            cagr,
            max_drawdown,
            years,
            periods,
        })
    }
}

pub fn compute_cagr(final_value: f64, years: f64) -> Result<f64, ReversionError> {
    if years <= 0.0 || !years.is_finite() {
        return Err(ReversionError::domain(format!(
            "elapsed years must be positive, got {years}"
        )));
    }
    if final_value <= 0.0 || !final_value.is_finite() {
        return Err(ReversionError::domain(format!(
            "final value must be positive, got {final_value}"
        )));
    }
    Ok(final_value.powf(1.0 / years) - 1.0)
}

pub fn compute_max_drawdown(values: &[f64]) -> f64 {
    let Some(&first) = values.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;
    for &v in values {
        if v > peak {
            peak = v;
        }
        max_dd = max_dd.min(v / peak - 1.0);
    }
    max_dd
}
