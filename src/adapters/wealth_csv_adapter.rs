//! Wealth series CSV writer for charting.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::ReversionError;
use crate::ports::report_port::ReportPort;
use std::path::PathBuf;

pub struct CsvWealthWriter {
    output_path: PathBuf,
}

impl CsvWealthWriter {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }
}

fn csv_error(e: csv::Error) -> ReversionError {
    let kind = match e.kind() {
        csv::ErrorKind::Io(io) => io.kind(),
        _ => std::io::ErrorKind::Other,
    };
    ReversionError::Io(std::io::Error::new(kind, e))
}

impl ReportPort for CsvWealthWriter {
    fn write(&self, result: &BacktestResult) -> Result<(), ReversionError> {
        let mut wtr = csv::Writer::from_path(&self.output_path).map_err(csv_error)?;
        wtr.write_record(["date", "wealth"]).map_err(csv_error)?;
        for point in &result.wealth.points {
            let date = point.date.map(|d| d.to_string()).unwrap_or_default();
            wtr.write_record([date, point.value.to_string()])
                .map_err(csv_error)?;
        }
        wtr.flush()?;
        log::info!(
            "wrote {} wealth points to {}",
            result.wealth.len(),
            self.output_path.display()
        );
        Ok(())
    }
}
