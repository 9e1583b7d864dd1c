//! Backtest engine: the day-by-day wealth recurrences.
//!
//! Both recurrences step over `t = window ..= n - 2`. The moving average at `t`
//! covers the `window` closes ending at `t`, and the return is realized from
//! close `t` to close `t + 1`. A series of `n` days therefore yields
//! `n - window` wealth entries including the 1.0 seed.

use crate::domain::error::ReversionError;
use crate::domain::metrics::PerformanceSummary;
use crate::domain::portfolio::WealthSeries;
use crate::domain::price_series::PriceSeries;
use crate::domain::rule::{AllocationState, MultiplicativeWeight, Signal, ThresholdReversion};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyConfig {
    Threshold(ThresholdReversion),
    MultiplicativeWeight(MultiplicativeWeight),
}

impl StrategyConfig {
    pub fn window(&self) -> usize {
        match self {
            StrategyConfig::Threshold(rule) => rule.window,
            StrategyConfig::MultiplicativeWeight(rule) => rule.window,
        }
    }

    /// Parameter checks that do not depend on the data.
    pub fn validate(&self) -> Result<(), ReversionError> {
        if self.window() == 0 {
            return Err(ReversionError::invalid(
                "strategy",
                "window",
                "window must be at least 1",
            ));
        }
        match self {
            StrategyConfig::Threshold(rule) => {
                if !rule.threshold.is_finite() || rule.threshold < 0.0 {
                    return Err(ReversionError::invalid(
                        "strategy",
                        "threshold",
                        "threshold must be a non-negative number",
                    ));
                }
            }
            StrategyConfig::MultiplicativeWeight(rule) => {
                if !(rule.leverage > 0.0 && rule.leverage <= 1.0) {
                    return Err(ReversionError::invalid(
                        "strategy",
                        "leverage",
                        "leverage must be in (0, 1]",
                    ));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for StrategyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyConfig::Threshold(rule) => write!(
                f,
                "threshold mean reversion (window={}, threshold={})",
                rule.window, rule.threshold
            ),
            StrategyConfig::MultiplicativeWeight(rule) => write!(
                f,
                "multiplicative weight mean reversion (window={}, leverage={})",
                rule.window, rule.leverage
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdRun {
    pub wealth: WealthSeries,
    pub days_invested: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedRun {
    pub wealth: WealthSeries,
    pub final_weights: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunDetail {
    Threshold { days_invested: usize },
    MultiplicativeWeight { final_weights: Vec<f64> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub strategy: StrategyConfig,
    pub wealth: WealthSeries,
    pub summary: PerformanceSummary,
    pub detail: RunDetail,
}

/// Smallest series length a run accepts.
pub fn minimum_days(window: usize) -> usize {
    window + 1
}

fn check_length(n_days: usize, window: usize) -> Result<(), ReversionError> {
    if window == 0 {
        return Err(ReversionError::invalid(
            "strategy",
            "window",
            "window must be at least 1",
        ));
    }
    if n_days < minimum_days(window) {
        return Err(ReversionError::InsufficientData {
            bars: n_days,
            minimum: minimum_days(window),
        });
    }
    Ok(())
}

/// Day 0 is never read: the first step's moving average starts at day 1.
fn check_prices(asset: usize, closes: &[f64]) -> Result<(), ReversionError> {
    match closes
        .iter()
        .enumerate()
        .skip(1)
        .find(|&(_, &c)| !c.is_finite() || c <= 0.0)
    {
        Some((index, &price)) => Err(ReversionError::InvalidPrice {
            asset,
            index,
            price,
        }),
        None => Ok(()),
    }
}

pub fn simulate_threshold(
    closes: &[f64],
    rule: &ThresholdReversion,
) -> Result<ThresholdRun, ReversionError> {
    StrategyConfig::Threshold(*rule).validate()?;
    check_length(closes.len(), rule.window)?;
    check_prices(0, closes)?;

    let n = closes.len();
    log::debug!(
        "threshold run: {} days, window={}, threshold={}",
        n,
        rule.window,
        rule.threshold
    );

    let mut wealth = WealthSeries::seeded();
    let mut days_invested = 0usize;

    for t in rule.window..n.saturating_sub(1) {
        let signal = rule.signal(closes, t).ok_or_else(|| {
            ReversionError::domain(format!("no signal defined at day {t}"))
        })?;
        let growth = match signal {
            Signal::Buy => {
                days_invested += 1;
                closes[t + 1] / closes[t]
            }
            Signal::HoldCash => 1.0,
        };
        log::trace!("t={t} signal={signal} growth={growth}");
        wealth.record_growth(growth);
    }

    Ok(ThresholdRun {
        wealth,
        days_invested,
    })
}

pub fn simulate_weighted(
    tracks: &[&[f64]],
    rule: &MultiplicativeWeight,
) -> Result<WeightedRun, ReversionError> {
    StrategyConfig::MultiplicativeWeight(*rule).validate()?;
    let first = tracks
        .first()
        .ok_or_else(|| ReversionError::input("no assets to allocate across"))?;
    let n = first.len();
    if let Some(track) = tracks.iter().find(|t| t.len() != n) {
        return Err(ReversionError::input(format!(
            "asset tracks differ in length: {} vs {}",
            track.len(),
            n
        )));
    }
    check_length(n, rule.window)?;
    for (asset, closes) in tracks.iter().enumerate() {
        check_prices(asset, closes)?;
    }

    log::debug!(
        "weighted run: {} assets, {} days, window={}, leverage={}",
        tracks.len(),
        n,
        rule.window,
        rule.leverage
    );

    let mut state = AllocationState::equal(tracks.len(), rule.leverage);
    let mut wealth = WealthSeries::seeded();

    for t in rule.window..n.saturating_sub(1) {
        let predicted = rule.predicted_relatives(tracks, t).ok_or_else(|| {
            ReversionError::domain(format!("no moving average defined at day {t}"))
        })?;
        if !state.update(&predicted) {
            log::warn!("t={t}: weight sum not positive, keeping prior weights");
        }

        let portfolio_return = 1.0
            + state
                .weights()
                .iter()
                .zip(tracks)
                .map(|(w, closes)| w * (closes[t + 1] / closes[t] - 1.0))
                .sum::<f64>();
        if !portfolio_return.is_finite() || portfolio_return <= 0.0 {
            return Err(ReversionError::domain(format!(
                "portfolio return {portfolio_return} at day {t} would make wealth non-positive"
            )));
        }
        log::trace!("t={t} weights={:?} return={portfolio_return}", state.weights());
        wealth.record_growth(portfolio_return);
    }

    Ok(WeightedRun {
        wealth,
        final_weights: state.into_weights(),
    })
}

/// Run `strategy` over `series`, date the wealth points and summarize.
pub fn run_backtest(
    series: &PriceSeries,
    strategy: &StrategyConfig,
) -> Result<BacktestResult, ReversionError> {
    strategy.validate()?;
    let closes = series.closes();

    let (wealth, detail) = match strategy {
        StrategyConfig::Threshold(rule) => {
            if closes.len() != 1 {
                return Err(ReversionError::invalid(
                    "data",
                    "paths",
                    format!(
                        "threshold rule trades a single asset, got {}",
                        closes.len()
                    ),
                ));
            }
            let run = simulate_threshold(&closes[0], rule)?;
            (
                run.wealth,
                RunDetail::Threshold {
                    days_invested: run.days_invested,
                },
            )
        }
        StrategyConfig::MultiplicativeWeight(rule) => {
            let views: Vec<&[f64]> = closes.iter().map(Vec::as_slice).collect();
            let run = simulate_weighted(&views, rule)?;
            (
                run.wealth,
                RunDetail::MultiplicativeWeight {
                    final_weights: run.final_weights,
                },
            )
        }
    };

    let dates = series.dates();
    let wealth = wealth.with_dates(&dates[strategy.window()..]);
    let summary = PerformanceSummary::compute(&wealth)?;

    Ok(BacktestResult {
        strategy: *strategy,
        wealth,
        summary,
        detail,
    })
}
