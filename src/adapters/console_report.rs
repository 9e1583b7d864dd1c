//! Console summary report.

use crate::domain::backtest::{BacktestResult, RunDetail};
use crate::domain::error::ReversionError;
use crate::ports::report_port::ReportPort;
use std::io::Write;

pub struct ConsoleReport;

impl ConsoleReport {
    pub fn render(result: &BacktestResult) -> String {
        let summary = &result.summary;
        let mut out = format!(
            "Final value: {:.2}\nCAGR: {:.2}%\nMax drawdown: {:.2}%\n",
            summary.final_value,
            summary.cagr * 100.0,
            summary.max_drawdown * 100.0
        );

        match &result.detail {
            RunDetail::Threshold { days_invested } => {
                let steps = summary.periods.saturating_sub(1);
                out.push_str(&format!("Days invested: {days_invested} of {steps}\n"));
            }
            RunDetail::MultiplicativeWeight { final_weights } => {
                let weights: Vec<String> =
                    final_weights.iter().map(|w| format!("{w:.4}")).collect();
                out.push_str(&format!("Final weights: {}\n", weights.join(", ")));
            }
        }
        out
    }
}

impl ReportPort for ConsoleReport {
    fn write(&self, result: &BacktestResult) -> Result<(), ReversionError> {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(Self::render(result).as_bytes())?;
        stdout.flush()?;
        Ok(())
    }
}
