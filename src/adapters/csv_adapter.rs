//! CSV file price adapter.
//!
//! Reads one asset per file. Leading header rows are skipped, and so are rows
//! whose close cell is not a number (blank lines, repeated header lines).

use crate::domain::config_validation::{DATA_SECTION, parse_or};
use crate::domain::error::ReversionError;
use crate::domain::price_series::{AssetPriceTrack, PricePoint};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvLayout {
    pub header_rows: usize,
    pub date_column: usize,
    pub close_column: usize,
}

impl Default for CsvLayout {
    /// Ticker row plus header row, close in the fifth column.
    fn default() -> Self {
        CsvLayout {
            header_rows: 2,
            date_column: 0,
            close_column: 4,
        }
    }
}

pub struct CsvAdapter {
    base_path: PathBuf,
    layout: CsvLayout,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf, layout: CsvLayout) -> Self {
        Self { base_path, layout }
    }

    pub fn from_config(base_path: PathBuf, config: &dyn ConfigPort) -> Result<Self, ReversionError> {
        let defaults = CsvLayout::default();
        let layout = CsvLayout {
            header_rows: parse_or(config, DATA_SECTION, "header_rows", defaults.header_rows)?,
            date_column: parse_or(config, DATA_SECTION, "date_column", defaults.date_column)?,
            close_column: parse_or(config, DATA_SECTION, "close_column", defaults.close_column)?,
        };
        Ok(Self::new(base_path, layout))
    }

    fn csv_path(&self, source: &str) -> PathBuf {
        self.base_path.join(source)
    }
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    let day = cell.trim().split([' ', 'T']).next()?;
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// File line on which `record` starts. The reader's position marks where it
/// began reading, which precedes any blank lines it skipped.
fn record_line(content: &str, record: &csv::StringRecord) -> usize {
    let start = record
        .position()
        .and_then(|p| usize::try_from(p.byte()).ok())
        .unwrap_or_default();
    let rest = content.get(start..).unwrap_or_default();
    let skipped = rest.len() - rest.trim_start_matches(['\r', '\n']).len();
    content
        .get(..start + skipped)
        .map_or(1, |prefix| prefix.matches('\n').count() + 1)
}

fn symbol_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl DataPort for CsvAdapter {
    fn fetch_closes(&self, source: &str) -> Result<AssetPriceTrack, ReversionError> {
        let path = self.csv_path(source);
        let content = fs::read_to_string(&path).map_err(|e| {
            ReversionError::input(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut points = Vec::new();
        let mut skipped = 0usize;

        for result in rdr.records().skip(self.layout.header_rows) {
            let record = result
                .map_err(|e| ReversionError::input(format!("CSV parse error: {}", e)))?;

            let close = match record
                .get(self.layout.close_column)
                .and_then(|c| c.trim().parse::<f64>().ok())
            {
                Some(close) => close,
                None => {
                    skipped += 1;
                    continue;
                }
            };

            let date_cell = record.get(self.layout.date_column).unwrap_or_default();
            let date = parse_date(date_cell).ok_or_else(|| {
                ReversionError::input(format!(
                    "{}: invalid date '{}' on line {}",
                    path.display(),
                    date_cell,
                    record_line(&content, &record)
                ))
            })?;

            if !close.is_finite() || close <= 0.0 {
                return Err(ReversionError::input(format!(
                    "{}: close {} on {} is not strictly positive",
                    path.display(),
                    close,
                    date
                )));
            }

            points.push(PricePoint { date, close });
        }

        if skipped > 0 {
            log::debug!("{}: skipped {} rows without a close", path.display(), skipped);
        }
        if points.is_empty() {
            return Err(ReversionError::input(format!(
                "{}: no price rows found",
                path.display()
            )));
        }

        points.sort_by_key(|p| p.date);
        Ok(AssetPriceTrack::new(symbol_of(&path), points))
    }
}
