//! Continuation 1 pattern assembler
//!
//! Bullish construction, mirrored for bearish. A trend leg tops at Point A, a
//! pullback bottoms at Point B, a lower high forms Point C (the breakout level),
//! a dip forms Point D, and a short recovery ends in an Exe bar closing above C.
//!
//! SMA20 and SMA50 are warmed up on 50 invisible precursor bars, so the arrays
//! attached to the pattern are defined at every visible bar.
//!
//! Flaws are four independent conditions OR-ed together. Only a realized
//! condition turns the label into `Other`; the moving-average condition is read
//! back from the computed indicators.

use super::helpers::{
    approach_bar, continue_from, draw, extended_bar, extreme, plain_from, step_bar, CLEAR_MARGIN,
    FAIL_MARGIN,
};
use super::single_bar;
use crate::indicators::{TrendIndicators, SLOW_WINDOW};
use crate::random::RandomSource;
use crate::{Bar, BarType, Level, Pattern, PatternType, Sentiment};

/// Invisible bars before the pattern
pub const PRECURSOR_BARS: usize = SLOW_WINDOW;
/// Per-bar precursor drift in the trend direction
const PRECURSOR_DRIFT: (f64, f64) = (-1.5, 3.0);
/// Expected total precursor drift
const PRECURSOR_TRAVEL: f64 = 37.5;

/// Distance of the first visible close below zero (bullish orientation)
const START_DEPTH: (f64, f64) = (60.0, 80.0);
const LEAD_STEP: (f64, f64) = (5.0, 10.0);
const LEAD_BARS: usize = 2;
const A_STEP: (f64, f64) = (5.0, 10.0);
const A_WICK: (f64, f64) = (3.0, 6.0);
const PULLBACK_STEP: (f64, f64) = (5.0, 9.0);
const B_WICK: (f64, f64) = (1.0, 3.0);
/// Point C as a fraction of the B-to-A distance
const C_RATIO: (f64, f64) = (0.4, 0.7);
const C_CLOSE: (f64, f64) = (1.0, 3.0);
/// Point D retraces this fraction of the C-to-B distance
const D_RATIO: (f64, f64) = (0.3, 0.6);
const D_PAD: (f64, f64) = (0.2, 1.0);
const RECOVERY_STEP: (f64, f64) = (2.0, 6.0);
const RECOVERY_LEN: (usize, usize) = (1, 2);
const SLOW_RECOVERY_LEN: usize = 4;

/// Flaw conditions of a Continuation 1; any realized one makes it `Other`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Continuation1Flaws {
    /// Recovery takes 4 bars
    pub slow_recovery: bool,
    /// Terminal bar is not an Exe bar
    pub non_exe_terminal: bool,
    /// Terminal bar closes short of Point C
    pub failed_breakout: bool,
    /// Precursors trend against the pattern so SMA20 crosses SMA50 the wrong way
    pub counter_trend: bool,
}

impl Continuation1Flaws {
    /// Each condition drawn independently with probability `chance`
    pub fn draw<R: RandomSource + ?Sized>(rng: &mut R, chance: f64) -> Self {
        Self {
            slow_recovery: rng.chance(chance),
            non_exe_terminal: rng.chance(chance),
            failed_breakout: rng.chance(chance),
            counter_trend: rng.chance(chance),
        }
    }

    /// Flawed with probability `flaw_chance`, then [`Self::draw`] with
    /// `condition_chance`
    pub fn draw_instance<R: RandomSource + ?Sized>(
        rng: &mut R,
        flaw_chance: f64,
        condition_chance: f64,
    ) -> Self {
        if rng.chance(flaw_chance) {
            Self::draw(rng, condition_chance)
        } else {
            Self::default()
        }
    }

    /// Any condition decided by bar geometry alone
    pub fn structural(&self) -> bool {
        self.slow_recovery || self.non_exe_terminal || self.failed_breakout
    }
}

/// Continuation 1 with a random sentiment.
///
/// With probability `flaw_chance` the instance is flawed; a flawed instance
/// then enables each [`Continuation1Flaws`] condition with probability
/// `condition_chance`. A flawed instance that draws no condition keeps its
/// pattern label.
pub fn continuation1<R: RandomSource + ?Sized>(
    rng: &mut R,
    flaw_chance: f64,
    condition_chance: f64,
) -> Pattern {
    let sentiment = rng.sentiment();
    let flaws = Continuation1Flaws::draw_instance(rng, flaw_chance, condition_chance);
    continuation1_with(rng, sentiment, flaws)
}

/// Continuation 1 with an explicit trend direction and flaw set.
///
/// Point C is the primary level and Point A the secondary one.
pub fn continuation1_with<R: RandomSource + ?Sized>(
    rng: &mut R,
    sentiment: Sentiment,
    flaws: Continuation1Flaws,
) -> Pattern {
    let sign = sentiment.sign();
    let against = sentiment.opposite();

    let start = -sign * draw(rng, START_DEPTH);
    let drift = if flaws.counter_trend { -sign } else { sign };
    let precursor = precursor_closes(rng, start - drift * PRECURSOR_TRAVEL, drift);
    let mut price = precursor.last().copied().unwrap_or(start);

    let recovery_len = if flaws.slow_recovery {
        SLOW_RECOVERY_LEN
    } else {
        rng.count(RECOVERY_LEN.0, RECOVERY_LEN.1)
    };
    let mut bars = Vec::with_capacity(LEAD_BARS + 6 + recovery_len);

    for _ in 0..LEAD_BARS {
        let step = sign * draw(rng, LEAD_STEP);
        let bar = step_bar(rng, price, step);
        price = bar.close;
        bars.push(bar);
    }

    let a_close = price + sign * draw(rng, A_STEP);
    let a_bar = extended_bar(rng, price, a_close, sentiment, A_WICK);
    let point_a = Level::new(extreme(&a_bar, sentiment), bars.len());
    bars.push(a_bar);

    let pullback_step = -sign * draw(rng, PULLBACK_STEP);
    let pullback = step_bar(rng, a_bar.close, pullback_step);
    bars.push(pullback);
    let b_close = pullback.close - sign * draw(rng, PULLBACK_STEP);
    let b_bar = extended_bar(rng, pullback.close, b_close, against, B_WICK);
    let point_b = extreme(&b_bar, against);
    bars.push(b_bar);

    let c_target = point_b + (point_a.price - point_b) * draw(rng, C_RATIO);
    let c_close = c_target - sign * draw(rng, C_CLOSE);
    let c_bar = capped_bar(rng, b_bar.close, c_close, sentiment, c_target);
    let point_c = Level::new(extreme(&c_bar, sentiment), bars.len());
    bars.push(c_bar);

    let d_close = point_c.price - (point_c.price - point_b) * draw(rng, D_RATIO);
    let d_bar = tight_bar(rng, c_bar.close, d_close);
    price = d_bar.close;
    bars.push(d_bar);

    for _ in 0..recovery_len {
        let bar = approach_bar(rng, price, point_c.price, sentiment, RECOVERY_STEP);
        price = bar.close;
        bars.push(bar);
    }

    let margin = if flaws.failed_breakout { FAIL_MARGIN } else { CLEAR_MARGIN };
    let terminal = if flaws.non_exe_terminal {
        plain_from(rng, price, point_c.price, sentiment, margin)
    } else {
        let template = single_bar::exe(rng, sentiment);
        continue_from(rng, &template, price, point_c.price, sentiment, margin)
    };
    bars.push(terminal);

    let visible: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let indicators = TrendIndicators::with_warmup(&precursor, &visible);
    let contradicted = trend_contradicted(&indicators, sentiment);
    log::trace!("continuation1: {sentiment:?}, {flaws:?}, sma contradicted={contradicted}");

    let label = if flaws.structural() || contradicted {
        PatternType::Other
    } else {
        PatternType::continuation1(sentiment)
    };
    Pattern::new(bars, label)
        .with_primary_level(point_c)
        .with_secondary_level(point_a)
        .with_indicators(indicators)
}

/// SMA20 on the wrong side of SMA50 at the last bar
pub fn trend_contradicted(indicators: &TrendIndicators, sentiment: Sentiment) -> bool {
    match indicators.last() {
        Some((fast, slow)) => match sentiment {
            Sentiment::Bullish => fast < slow,
            Sentiment::Bearish => fast > slow,
        },
        None => false,
    }
}

fn precursor_closes<R: RandomSource + ?Sized>(rng: &mut R, start: f64, drift: f64) -> Vec<f64> {
    let mut price = start;
    (0..PRECURSOR_BARS)
        .map(|_| {
            price += drift * draw(rng, PRECURSOR_DRIFT);
            price
        })
        .collect()
}

/// Bar whose `side` extreme is `cap`, or the body edge when the body reaches past it
fn capped_bar<R: RandomSource + ?Sized>(
    rng: &mut R,
    open: f64,
    close: f64,
    side: Sentiment,
    cap: f64,
) -> Bar {
    let pad = draw(rng, D_PAD);
    let (high, low) = match side {
        Sentiment::Bullish => (cap.max(open.max(close)), open.min(close) - pad),
        Sentiment::Bearish => (open.max(close) + pad, cap.min(open.min(close))),
    };
    Bar::new(open, high, low, close, BarType::Other)
}

fn tight_bar<R: RandomSource + ?Sized>(rng: &mut R, open: f64, close: f64) -> Bar {
    let high = open.max(close) + draw(rng, D_PAD);
    let low = open.min(close) - draw(rng, D_PAD);
    Bar::new(open, high, low, close, BarType::Other)
}
