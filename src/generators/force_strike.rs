//! Force Strike pattern assemblers
//!
//! A force strike is a mother bar, an inside bar contained in it, and a cluster
//! that breaks one side of the mother bar and closes back inside.
//!
//! - **Base**: mother + inside + cluster at the mother's extreme.
//! - **Continuation**: same construction as Base.
//! - **Swing point**: the mother role is played by a bar testing a prior swing
//!   extreme, which is recorded as the pattern's level.

use super::cluster::{reversal_cluster, ClusterOptions};
use super::helpers::{
    breakout_bar, draw, extended_bar, extreme, inside_bar, mother_bar, padded_bar, step_bar,
    FAIL_MARGIN,
};
use crate::random::RandomSource;
use crate::{BarType, Level, OhlcExt, Pattern, PatternType, Sentiment};

/// Starting price of a swing-point pattern (bullish orientation)
const SWING_START: (f64, f64) = (-10.0, 20.0);
/// Step of each bar in the run into the swing
const SWING_RUN_STEP: (f64, f64) = (10.0, 20.0);
/// Body move of the swing bar, in the run's direction
const SWING_BODY: (f64, f64) = (0.0, 8.0);
/// Wick that forms the swing extreme
const SWING_WICK: (f64, f64) = (8.0, 15.0);
/// Retracement away from the swing
const RETRACE_STEP: (f64, f64) = (15.0, 30.0);
/// Distance the test bar closes from the swing level
const TEST_CLOSE: (f64, f64) = (2.0, 8.0);

/// Base force strike. With probability `flaw_chance` the cluster is replaced
/// by a single bar that breaks the mother's extreme and closes beyond it.
pub fn base_force_strike<R: RandomSource + ?Sized>(rng: &mut R, flaw_chance: f64) -> Pattern {
    let sentiment = rng.sentiment();
    let flawed = rng.chance(flaw_chance);
    base_force_strike_with(rng, sentiment, flawed)
}

/// Base force strike with sentiment and flaw fixed by the caller
pub fn base_force_strike_with<R: RandomSource + ?Sized>(
    rng: &mut R,
    sentiment: Sentiment,
    flawed: bool,
) -> Pattern {
    log::trace!("force strike: {sentiment:?}, flawed={flawed}");
    let mother = mother_bar(rng);
    let inside = inside_bar(rng, &mother);

    let mut bars = vec![mother, inside];
    if flawed {
        let level = extreme(&mother, sentiment.opposite());
        let open = rng.uniform(inside.body_bottom(), inside.body_top());
        bars.push(breakout_bar(rng, open, level, sentiment, FAIL_MARGIN));
        Pattern::new(bars, PatternType::Other)
    } else {
        bars.extend(reversal_cluster(rng, &mother, sentiment, ClusterOptions::default()));
        Pattern::new(bars, PatternType::force_strike(sentiment))
    }
}

/// Continuation force strike; no trend context is generated
pub fn continuation_force_strike<R: RandomSource + ?Sized>(
    rng: &mut R,
    flaw_chance: f64,
) -> Pattern {
    base_force_strike(rng, flaw_chance)
}

/// Force strike at a swing point.
///
/// Two bars run into a swing extreme, one bar retraces, and a test bar returns
/// to close near the swing level. The test bar is the mother of a nested
/// mother + inside + cluster force strike. With probability `flaw_chance` the
/// cluster ends on a non-Exe bar and the pattern is labeled `Other`.
pub fn swing_point_force_strike<R: RandomSource + ?Sized>(
    rng: &mut R,
    flaw_chance: f64,
) -> Pattern {
    let sentiment = rng.sentiment();
    let flawed = rng.chance(flaw_chance);
    swing_point_force_strike_with(rng, sentiment, flawed)
}

/// Swing-point force strike with sentiment and flaw fixed by the caller
pub fn swing_point_force_strike_with<R: RandomSource + ?Sized>(
    rng: &mut R,
    sentiment: Sentiment,
    flawed: bool,
) -> Pattern {
    let sign = sentiment.sign();
    log::trace!("swing point force strike: {sentiment:?}, flawed={flawed}");

    let mut bars = Vec::with_capacity(11);
    let mut price = sign * draw(rng, SWING_START);
    for _ in 0..2 {
        let step = -sign * draw(rng, SWING_RUN_STEP);
        let bar = step_bar(rng, price, step);
        price = bar.close;
        bars.push(bar);
    }

    let swing_close = price - sign * draw(rng, SWING_BODY);
    let swing = extended_bar(rng, price, swing_close, sentiment.opposite(), SWING_WICK);
    let swing_level = Level::new(extreme(&swing, sentiment.opposite()), bars.len());
    bars.push(swing);

    let retrace_step = sign * draw(rng, RETRACE_STEP);
    let retrace = step_bar(rng, swing.close, retrace_step);
    bars.push(retrace);

    let test_close = swing_level.price + sign * draw(rng, TEST_CLOSE);
    let test = padded_bar(rng, retrace.close, test_close, BarType::Other);
    bars.push(test);
    bars.push(inside_bar(rng, &test));

    let options = if flawed {
        ClusterOptions::default().without_exe()
    } else {
        ClusterOptions::default()
    };
    bars.extend(reversal_cluster(rng, &test, sentiment, options));

    let label = if flawed {
        PatternType::Other
    } else {
        PatternType::force_strike(sentiment)
    };
    Pattern::new(bars, label).with_primary_level(swing_level)
}
