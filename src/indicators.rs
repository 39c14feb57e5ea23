//! Trailing trend indicators
//!
//! Simple moving averages over closing prices. Patterns that carry indicators
//! warm them up on invisible precursor bars so the visible window starts with
//! fully defined values.

use serde::{Deserialize, Serialize};

/// Short moving-average window.
pub const FAST_WINDOW: usize = 20;
/// Long moving-average window.
pub const SLOW_WINDOW: usize = 50;

/// Trailing simple moving average.
///
/// Index `i` is `None` while `i < window - 1`, otherwise the mean of the
/// `window` values ending at `i`. A zero window yields all `None`.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let mut sum: f64 = values[..window].iter().sum();
    out[window - 1] = Some(sum / window as f64);
    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out[i] = Some(sum / window as f64);
    }
    out
}

/// SMA20 and SMA50 series aligned 1:1 with a pattern's visible bars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendIndicators {
    pub sma20: Vec<Option<f64>>,
    pub sma50: Vec<Option<f64>>,
}

impl TrendIndicators {
    /// Compute both averages over `precursor ++ visible` closes, then drop the
    /// precursor prefix.
    pub fn with_warmup(precursor: &[f64], visible: &[f64]) -> Self {
        let closes: Vec<f64> = precursor.iter().chain(visible).copied().collect();
        let skip = precursor.len();
        Self {
            sma20: sma(&closes, FAST_WINDOW).split_off(skip),
            sma50: sma(&closes, SLOW_WINDOW).split_off(skip),
        }
    }

    pub fn len(&self) -> usize {
        self.sma20.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sma20.is_empty()
    }

    /// Fast and slow values at the last visible bar, when both are defined.
    pub fn last(&self) -> Option<(f64, f64)> {
        Some(((*self.sma20.last()?)?, (*self.sma50.last()?)?))
    }
}
