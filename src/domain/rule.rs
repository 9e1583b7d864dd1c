//! Allocation rules.
//!
//! - `ThresholdReversion`: single asset, buy for one day when the close dips
//!   below its moving average by more than `threshold`.
//! - `MultiplicativeWeight`: multi-asset, scales each weight by its predicted
//!   price relative `ma / close` and renormalizes to `leverage`.
//! - `AllocationState`: the weight vector carried between days.

use crate::domain::moving_average::trailing_mean;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Buy,
    HoldCash,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::HoldCash => write!(f, "HOLD-CASH"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdReversion {
    pub window: usize,
    pub threshold: f64,
}

impl ThresholdReversion {
    pub const DEFAULT_WINDOW: usize = 20;
    pub const DEFAULT_THRESHOLD: f64 = 0.02;

    /// Decision at day `t`. `None` before the window fills or on the last day,
    /// where there is no next close to realize.
    pub fn signal(&self, closes: &[f64], t: usize) -> Option<Signal> {
        if t + 1 >= closes.len() {
            return None;
        }
        let ma = trailing_mean(closes, t, self.window)?;
        if closes[t] < (1.0 - self.threshold) * ma {
            Some(Signal::Buy)
        } else {
            Some(Signal::HoldCash)
        }
    }
}

impl Default for ThresholdReversion {
    fn default() -> Self {
        Self {
            window: Self::DEFAULT_WINDOW,
            threshold: Self::DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MultiplicativeWeight {
    pub window: usize,
    pub leverage: f64,
}

impl MultiplicativeWeight {
    pub const DEFAULT_WINDOW: usize = 25;
    pub const DEFAULT_LEVERAGE: f64 = 0.2;

    /// `ma_i / close_i[t]` per asset; above 1 when the close sits under its average.
    pub fn predicted_relatives(&self, tracks: &[&[f64]], t: usize) -> Option<Vec<f64>> {
        tracks
            .iter()
            .map(|closes| trailing_mean(closes, t, self.window).map(|ma| ma / closes[t]))
            .collect()
    }
}

impl Default for MultiplicativeWeight {
    fn default() -> Self {
        Self {
            window: Self::DEFAULT_WINDOW,
            leverage: Self::DEFAULT_LEVERAGE,
        }
    }
}

/// Per-asset weights summing to `leverage`; the rest of the capital is idle cash.
#[derive(Debug, Clone, PartialEq)]
pub struct AllocationState {
    weights: Vec<f64>,
    leverage: f64,
}

impl AllocationState {
    pub fn equal(n_assets: usize, leverage: f64) -> Self {
        let each = if n_assets == 0 {
            0.0
        } else {
            leverage / n_assets as f64
        };
        Self {
            weights: vec![each; n_assets],
            leverage,
        }
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn total(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Multiplicative update. Returns false and keeps the prior weights when the
    /// unnormalized sum is not positive.
    pub fn update(&mut self, predicted: &[f64]) -> bool {
        let scaled: Vec<f64> = self
            .weights
            .iter()
            .zip(predicted)
            .map(|(w, p)| w * p)
            .collect();
        let total: f64 = scaled.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            return false;
        }
        self.weights = scaled
            .into_iter()
            .map(|w| self.leverage * w / total)
            .collect();
        true
    }

    pub fn into_weights(self) -> Vec<f64> {
        self.weights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn dip_series() -> Vec<f64> {
        let mut closes = vec![100.0; 19];
        closes.push(90.0);
        closes.push(100.0);
        closes
    }

    #[test]
    fn threshold_buys_on_dip() {
        let rule = ThresholdReversion::default();
        assert_eq!(rule.signal(&dip_series(), 19), Some(Signal::Buy));
    }

    #[test]
    fn threshold_holds_cash_on_flat_prices() {
        let rule = ThresholdReversion::default();
        let closes = vec![100.0; 25];
        for t in 19..24 {
            assert_eq!(rule.signal(&closes, t), Some(Signal::HoldCash));
        }
    }

    #[test]
    fn threshold_zero_buys_any_close_below_average() {
        let rule = ThresholdReversion {
            window: 3,
            threshold: 0.0,
        };
        assert_eq!(rule.signal(&[10.0, 10.0, 9.99, 11.0], 2), Some(Signal::Buy));
        assert_eq!(
            rule.signal(&[10.0, 10.0, 10.0, 11.0], 2),
            Some(Signal::HoldCash)
        );
    }

    #[test]
    fn threshold_small_dip_is_not_enough() {
        let rule = ThresholdReversion::default();
        let mut closes = vec![100.0; 19];
        closes.push(99.0);
        closes.push(100.0);
        assert_eq!(rule.signal(&closes, 19), Some(Signal::HoldCash));
    }

    #[test]
    fn threshold_edges_are_skipped() {
        let rule = ThresholdReversion::default();
        let closes = dip_series();
        assert_eq!(rule.signal(&closes, 18), None);
        assert_eq!(rule.signal(&closes, 20), None);
        assert_eq!(rule.signal(&closes, 40), None);
    }

    #[test]
    fn signal_display() {
        assert_eq!(Signal::Buy.to_string(), "BUY");
        assert_eq!(Signal::HoldCash.to_string(), "HOLD-CASH");
    }

    #[test]
    fn predicted_relative_is_average_over_close() {
        let rule = MultiplicativeWeight {
            window: 2,
            leverage: 0.5,
        };
        let a = [100.0, 80.0];
        let b = [100.0, 100.0];
        let pred = rule.predicted_relatives(&[&a, &b], 1).unwrap();
        assert_relative_eq!(pred[0], 90.0 / 80.0);
        assert_relative_eq!(pred[1], 1.0);
        assert!(rule.predicted_relatives(&[&a, &b], 0).is_none());
    }

    #[test]
    fn equal_allocation() {
        let state = AllocationState::equal(4, 0.2);
        for &w in state.weights() {
            assert_relative_eq!(w, 0.05);
        }
        assert_relative_eq!(state.total(), 0.2);
        assert!(AllocationState::equal(0, 0.2).weights().is_empty());
    }

    #[test]
    fn update_favors_asset_below_average() {
        let mut state = AllocationState::equal(2, 0.2);
        assert!(state.update(&[1.25, 1.0]));
        let w = state.weights();
        assert!(w[0] > w[1]);
        assert_relative_eq!(state.total(), 0.2, epsilon = 1e-12);
        assert_relative_eq!(w[0], 0.2 * 1.25 / 2.25, epsilon = 1e-12);
    }

    #[test]
    fn update_keeps_flat_weights() {
        let mut state = AllocationState::equal(2, 0.2);
        assert!(state.update(&[1.0, 1.0]));
        assert_relative_eq!(state.weights()[0], 0.1, epsilon = 1e-15);
        assert_relative_eq!(state.weights()[1], 0.1, epsilon = 1e-15);
    }

    #[test]
    fn degenerate_sum_keeps_prior_weights() {
        let mut state = AllocationState::equal(3, 0.3);
        let before = state.clone();
        assert!(!state.update(&[0.0, 0.0, 0.0]));
        assert_eq!(state, before);
    }

    #[test]
    fn defaults_match_configuration_surface() {
        let t = ThresholdReversion::default();
        assert_eq!(t.window, 20);
        assert_relative_eq!(t.threshold, 0.02);

        let m = MultiplicativeWeight::default();
        assert_eq!(m.window, 25);
        assert_relative_eq!(m.leverage, 0.2);
    }
}
