//! Configuration validation.
//!
//! Validates and resolves all config fields before a backtest runs. Sections
//! other than `[strategy]` and `[data]` are rejected, and so are keys outside
//! the recognized set of a section.

use crate::domain::backtest::StrategyConfig;
use crate::domain::error::ReversionError;
use crate::domain::rule::{MultiplicativeWeight, ThresholdReversion};
use crate::ports::config_port::ConfigPort;
use std::str::FromStr;

pub const STRATEGY_SECTION: &str = "strategy";
pub const DATA_SECTION: &str = "data";

pub const DATA_KEYS: &[&str] = &["paths", "header_rows", "date_column", "close_column"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    Threshold,
    MultiplicativeWeight,
}

impl RuleKind {
    pub fn recognized_keys(&self) -> &'static [&'static str] {
        match self {
            RuleKind::Threshold => &["rule", "window", "threshold"],
            RuleKind::MultiplicativeWeight => &["rule", "window", "leverage"],
        }
    }
}

impl FromStr for RuleKind {
    type Err = ReversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "threshold" => Ok(RuleKind::Threshold),
            "multiplicative_weight" | "olmar" => Ok(RuleKind::MultiplicativeWeight),
            other => Err(ReversionError::invalid(
                STRATEGY_SECTION,
                "rule",
                format!("unknown rule '{other}', expected threshold or multiplicative_weight"),
            )),
        }
    }
}

pub fn validate_sections(config: &dyn ConfigPort) -> Result<(), ReversionError> {
    match config
        .sections()
        .into_iter()
        .find(|s| s != STRATEGY_SECTION && s != DATA_SECTION)
    {
        Some(section) => {
            let key = config.keys(&section).into_iter().next().unwrap_or_default();
            Err(ReversionError::invalid(&section, &key, "unrecognized section"))
        }
        None => Ok(()),
    }
}

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<StrategyConfig, ReversionError> {
    let kind: RuleKind = config
        .get_string(STRATEGY_SECTION, "rule")
        .ok_or_else(|| ReversionError::ConfigMissing {
            section: STRATEGY_SECTION.to_string(),
            key: "rule".to_string(),
        })?
        .parse()?;

    reject_unknown_keys(config, STRATEGY_SECTION, kind.recognized_keys())?;

    let strategy = match kind {
        RuleKind::Threshold => StrategyConfig::Threshold(ThresholdReversion {
            window: parse_or(config, STRATEGY_SECTION, "window", ThresholdReversion::DEFAULT_WINDOW)?,
            threshold: parse_or(
                config,
                STRATEGY_SECTION,
                "threshold",
                ThresholdReversion::DEFAULT_THRESHOLD,
            )?,
        }),
        RuleKind::MultiplicativeWeight => {
            StrategyConfig::MultiplicativeWeight(MultiplicativeWeight {
                window: parse_or(
                    config,
                    STRATEGY_SECTION,
                    "window",
                    MultiplicativeWeight::DEFAULT_WINDOW,
                )?,
                leverage: parse_or(
                    config,
                    STRATEGY_SECTION,
                    "leverage",
                    MultiplicativeWeight::DEFAULT_LEVERAGE,
                )?,
            })
        }
    };

    strategy.validate()?;
    Ok(strategy)
}

pub fn validate_data_config(config: &dyn ConfigPort) -> Result<(), ReversionError> {
    reject_unknown_keys(config, DATA_SECTION, DATA_KEYS)?;
    for key in ["header_rows", "date_column", "close_column"] {
        parse_or::<usize>(config, DATA_SECTION, key, 0)?;
    }
    Ok(())
}

/// Comma-separated data paths; an explicit override wins over the config.
pub fn resolve_paths(overrides: &[String], config: &dyn ConfigPort) -> Vec<String> {
    if !overrides.is_empty() {
        return overrides.to_vec();
    }
    config
        .get_string(DATA_SECTION, "paths")
        .map(|paths| {
            paths
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

pub fn validate_paths(strategy: &StrategyConfig, paths: &[String]) -> Result<(), ReversionError> {
    if paths.is_empty() {
        return Err(ReversionError::ConfigMissing {
            section: DATA_SECTION.to_string(),
            key: "paths".to_string(),
        });
    }
    if matches!(strategy, StrategyConfig::Threshold(_)) && paths.len() != 1 {
        return Err(ReversionError::invalid(
            DATA_SECTION,
            "paths",
            format!("threshold rule trades a single asset, got {}", paths.len()),
        ));
    }
    Ok(())
}

pub fn parse_or<T: FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: T,
) -> Result<T, ReversionError> {
    match config.get_string(section, key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            ReversionError::invalid(section, key, format!("cannot parse '{raw}'"))
        }),
    }
}

fn reject_unknown_keys(
    config: &dyn ConfigPort,
    section: &str,
    recognized: &[&str],
) -> Result<(), ReversionError> {
    match config
        .keys(section)
        .into_iter()
        .find(|k| !recognized.contains(&k.as_str()))
    {
        Some(key) => Err(ReversionError::invalid(
            section,
            &key,
            "unrecognized parameter",
        )),
        None => Ok(()),
    }
}
