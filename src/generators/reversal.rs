//! Reversal 1 pattern assembler
//!
//! Bullish construction, mirrored for bearish:
//!
//! 1. Two bars run down into a swing low, Point X, set by a long lower wick.
//! 2. One bar retraces up; its high is Point Y.
//! 3. A short flush of 1-3 bars falls back toward X without closing through it.
//! 4. An Exe bar sweeps below X and closes back above it.
//!
//! A flawed instance breaks exactly one of these rules and is labeled `Other`.

use super::helpers::{
    approach_bar, continue_from, draw, extended_bar, extreme, plain_from, step_bar, CLEAR_MARGIN,
    FAIL_MARGIN,
};
use super::single_bar;
use crate::random::RandomSource;
use crate::{Level, Pattern, PatternType, Sentiment};

/// Starting price (bullish orientation)
const START: (f64, f64) = (-10.0, 20.0);
/// Step of each bar in the run into Point X
const RUN_STEP: (f64, f64) = (10.0, 20.0);
/// Body move of the Point X bar
const SWING_BODY: (f64, f64) = (0.0, 6.0);
/// Wick that sets Point X
const SWING_WICK: (f64, f64) = (8.0, 15.0);
/// Retracement from X toward Y
const RETRACE_STEP: (f64, f64) = (20.0, 35.0);
/// Wick that sets Point Y
const RETRACE_WICK: (f64, f64) = (2.0, 6.0);
/// Step of each flush bar back toward X
const FLUSH_STEP: (f64, f64) = (8.0, 16.0);
const FLUSH_LEN: (usize, usize) = (1, 3);
const SLOW_FLUSH_LEN: usize = 5;

/// The single rule a flawed Reversal 1 breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reversal1Flaw {
    /// Flush takes 5 bars
    SlowFlush,
    /// Terminal bar is not an Exe bar
    NonExeTerminal,
    /// Terminal bar sweeps X but closes on the wrong side of it
    FailedClear,
}

impl Reversal1Flaw {
    pub const ALL: [Reversal1Flaw; 3] = [
        Reversal1Flaw::SlowFlush,
        Reversal1Flaw::NonExeTerminal,
        Reversal1Flaw::FailedClear,
    ];

    /// `None` with probability `1 - chance`, otherwise a uniform pick
    pub fn draw<R: RandomSource + ?Sized>(rng: &mut R, chance: f64) -> Option<Self> {
        if rng.chance(chance) {
            Some(Self::ALL[rng.pick(Self::ALL.len())])
        } else {
            None
        }
    }
}

/// Reversal 1 with a random sentiment. With probability `flaw_chance` one
/// uniformly chosen [`Reversal1Flaw`] is applied.
pub fn reversal1<R: RandomSource + ?Sized>(rng: &mut R, flaw_chance: f64) -> Pattern {
    let sentiment = rng.sentiment();
    let flaw = Reversal1Flaw::draw(rng, flaw_chance);
    reversal1_with(rng, sentiment, flaw)
}

/// Reversal 1 with an explicit direction and flaw.
///
/// `sentiment` is the direction of the final reversal. Labels are
/// [`PatternType::reversal1`] of it, or `Other` when `flaw` is set.
/// Point X is the primary level and Point Y the secondary one.
pub fn reversal1_with<R: RandomSource + ?Sized>(
    rng: &mut R,
    sentiment: Sentiment,
    flaw: Option<Reversal1Flaw>,
) -> Pattern {
    log::trace!("reversal1: {sentiment:?}, flaw={flaw:?}");
    let sign = sentiment.sign();
    let against = sentiment.opposite();

    let flush_len = match flaw {
        Some(Reversal1Flaw::SlowFlush) => SLOW_FLUSH_LEN,
        _ => rng.count(FLUSH_LEN.0, FLUSH_LEN.1),
    };
    let mut bars = Vec::with_capacity(5 + flush_len);

    let mut price = sign * draw(rng, START);
    for _ in 0..2 {
        let step = -sign * draw(rng, RUN_STEP);
        let bar = step_bar(rng, price, step);
        price = bar.close;
        bars.push(bar);
    }

    let swing_close = price - sign * draw(rng, SWING_BODY);
    let swing = extended_bar(rng, price, swing_close, against, SWING_WICK);
    let point_x = Level::new(extreme(&swing, against), bars.len());
    bars.push(swing);

    let retrace_close = swing.close + sign * draw(rng, RETRACE_STEP);
    let retrace = extended_bar(rng, swing.close, retrace_close, sentiment, RETRACE_WICK);
    let point_y = Level::new(extreme(&retrace, sentiment), bars.len());
    bars.push(retrace);

    price = retrace.close;
    for _ in 0..flush_len {
        let bar = approach_bar(rng, price, point_x.price, against, FLUSH_STEP);
        price = bar.close;
        bars.push(bar);
    }

    let terminal = match flaw {
        Some(Reversal1Flaw::NonExeTerminal) => {
            plain_from(rng, price, point_x.price, sentiment, CLEAR_MARGIN)
        }
        Some(Reversal1Flaw::FailedClear) => {
            let template = single_bar::exe(rng, sentiment);
            continue_from(rng, &template, price, point_x.price, sentiment, FAIL_MARGIN)
        }
        _ => {
            let template = single_bar::exe(rng, sentiment);
            continue_from(rng, &template, price, point_x.price, sentiment, CLEAR_MARGIN)
        }
    };
    bars.push(terminal);

    let label = match flaw {
        Some(_) => PatternType::Other,
        None => PatternType::reversal1(sentiment),
    };
    Pattern::new(bars, label)
        .with_primary_level(point_x)
        .with_secondary_level(point_y)
}
