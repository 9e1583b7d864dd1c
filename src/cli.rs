//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::console_report::ConsoleReport;
use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::wealth_csv_adapter::CsvWealthWriter;
use crate::domain::backtest::{self as backtest_engine, BacktestResult, StrategyConfig};
use crate::domain::config_validation::{
    resolve_paths, validate_data_config, validate_paths, validate_sections,
    validate_strategy_config,
};
use crate::domain::error::ReversionError;
use crate::domain::price_series::{PriceSeries, align_tracks};
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "reversion", about = "Mean-reversion portfolio backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Price CSV file(s); overrides [data] paths
        #[arg(short, long)]
        data: Vec<String>,
        /// Write the wealth series to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            data,
            output,
        } => run_backtest(&config, &data, output.as_ref()),
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ReversionError> {
    FileConfigAdapter::from_file(path).map_err(|e| ReversionError::ConfigParse {
        file: path.display().to_string(),
        reason: e.to_string(),
    })
}

fn report_failure(err: &ReversionError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn run_backtest(config_path: &Path, data_overrides: &[String], output: Option<&PathBuf>) -> ExitCode {
    match backtest_from_config(config_path, data_overrides) {
        Ok(result) => {
            if let Err(e) = ConsoleReport.write(&result) {
                return report_failure(&e);
            }
            if let Some(path) = output {
                if let Err(e) = CsvWealthWriter::new(path.clone()).write(&result) {
                    return report_failure(&e);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => report_failure(&e),
    }
}

/// Load, validate and run everything a config file describes.
pub fn backtest_from_config(
    config_path: &Path,
    data_overrides: &[String],
) -> Result<BacktestResult, ReversionError> {
    log::info!("Loading config from {}", config_path.display());
    let config = load_config(config_path)?;

    validate_sections(&config)?;
    let strategy = validate_strategy_config(&config)?;
    validate_data_config(&config)?;

    let paths = resolve_paths(data_overrides, &config);
    validate_paths(&strategy, &paths)?;

    // Configured paths are relative to the config file, overrides to the working directory.
    let base = if data_overrides.is_empty() {
        config_path.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        PathBuf::new()
    };
    let data_port = CsvAdapter::from_config(base, &config)?;

    run_backtest_pipeline(&data_port, &strategy, &paths)
}

/// Fetch every source and align them on their common dates.
pub fn load_series(
    data_port: &dyn DataPort,
    sources: &[String],
) -> Result<PriceSeries, ReversionError> {
    let tracks = sources
        .iter()
        .map(|source| data_port.fetch_closes(source))
        .collect::<Result<Vec<_>, _>>()?;

    if tracks.len() > 1 {
        let longest = tracks.iter().map(|t| t.len()).max().unwrap_or(0);
        let aligned = align_tracks(tracks);
        let common = aligned.first().map(|t| t.len()).unwrap_or(0);
        if common < longest {
            log::warn!(
                "aligned {} assets on {} common dates, dropped up to {} days",
                aligned.len(),
                common,
                longest - common
            );
        }
        return PriceSeries::new(aligned);
    }

    PriceSeries::new(tracks)
}

pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    strategy: &StrategyConfig,
    sources: &[String],
) -> Result<BacktestResult, ReversionError> {
    let series = load_series(data_port, sources)?;
    let dates = series.dates();
    log::info!(
        "Running {} over {} assets, {} days ({} to {})",
        strategy,
        series.asset_count(),
        series.len(),
        dates[0],
        dates[dates.len() - 1],
    );

    let result = backtest_engine::run_backtest(&series, strategy)?;
    log::info!("Simulated {} wealth points", result.wealth.len());
    Ok(result)
}

fn run_validate(config_path: &Path) -> ExitCode {
    let validated = load_config(config_path).and_then(|config| {
        validate_sections(&config)?;
        let strategy = validate_strategy_config(&config)?;
        validate_data_config(&config)?;
        let paths = resolve_paths(&[], &config);
        validate_paths(&strategy, &paths)?;
        Ok((strategy, paths))
    });

    match validated {
        Ok((strategy, paths)) => {
            println!("Strategy: {strategy}");
            println!("Data:     {}", paths.join(", "));
            eprintln!("\nConfiguration is valid.");
            ExitCode::SUCCESS
        }
        Err(e) => report_failure(&e),
    }
}
