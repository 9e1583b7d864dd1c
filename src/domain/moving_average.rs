//! Trailing simple moving average.
//!
//! SMA(n)[t] = sum(C[t-j] for j in 0..n) / n
//! Defined for t >= n - 1.

/// Mean of the `window` closes ending at `t` inclusive, or `None` when the
/// window does not fit.
pub fn trailing_mean(closes: &[f64], t: usize, window: usize) -> Option<f64> {
    if window == 0 || t >= closes.len() || t + 1 < window {
        return None;
    }
    let start = t + 1 - window;
    let sum: f64 = closes[start..=t].iter().sum();
    Some(sum / window as f64)
}
