//! Approach-then-reversal bar cluster
//!
//! Shared by every breakout-style pattern: a short run of bars drifts from the
//! reference bar's body toward a breakout level, then a terminal bar sweeps the
//! level and closes back on the reversing side. Each bar opens exactly at the
//! previous close.

use super::helpers::{approach_bar, continue_from, plain_from, CLEAR_MARGIN};
use super::single_bar;
use crate::random::RandomSource;
use crate::{Bar, OhlcExt, Sentiment};

/// Step each approach bar takes toward the level
pub const APPROACH_STEP: (f64, f64) = (5.0, 15.0);

/// Cluster length range for a valid reversal
pub const CLUSTER_LEN: (usize, usize) = (1, 3);
/// Cluster length range for a too-slow reversal
pub const SLOW_CLUSTER_LEN: (usize, usize) = (4, 5);

/// Cluster construction flags
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClusterOptions {
    /// Breakout level; defaults to the reference low (bullish) or high (bearish)
    pub level: Option<f64>,
    /// Build 4-5 bars instead of 1-3
    pub is_slow: bool,
    /// End on a plain bar instead of an Exe bar
    pub no_exe: bool,
}

impl ClusterOptions {
    pub fn with_level(mut self, level: f64) -> Self {
        self.level = Some(level);
        self
    }

    pub fn slow(mut self) -> Self {
        self.is_slow = true;
        self
    }

    pub fn without_exe(mut self) -> Self {
        self.no_exe = true;
        self
    }
}

/// Build the approach-then-reversal cluster after `reference`
///
/// The last bar always closes on the `sentiment` side of the breakout level.
pub fn reversal_cluster<R: RandomSource + ?Sized>(
    rng: &mut R,
    reference: &Bar,
    sentiment: Sentiment,
    options: ClusterOptions,
) -> Vec<Bar> {
    let (min_len, max_len) = if options.is_slow {
        SLOW_CLUSTER_LEN
    } else {
        CLUSTER_LEN
    };
    let len = rng.count(min_len, max_len);
    let level = options.level.unwrap_or(match sentiment {
        Sentiment::Bullish => reference.low,
        Sentiment::Bearish => reference.high,
    });

    let mut price = rng.uniform(reference.body_bottom(), reference.body_top());
    let mut bars = Vec::with_capacity(len);

    for _ in 1..len {
        let bar = approach_bar(rng, price, level, sentiment.opposite(), APPROACH_STEP);
        price = bar.close;
        bars.push(bar);
    }

    let terminal = if options.no_exe {
        plain_from(rng, price, level, sentiment, CLEAR_MARGIN)
    } else {
        let template = single_bar::exe(rng, sentiment);
        continue_from(rng, &template, price, level, sentiment, CLEAR_MARGIN)
    };
    bars.push(terminal);

    bars
}
