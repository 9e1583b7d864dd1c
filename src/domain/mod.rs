//! Core domain types and logic.

pub mod price_series;
pub mod moving_average;
pub mod rule;
pub mod portfolio;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;
