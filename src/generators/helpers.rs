//! Geometry primitives shared by the bar and pattern generators
//!
//! Every random range used by more than one generator lives here, together with
//! the bar-building primitives that keep OHLC consistency by construction.

use crate::random::RandomSource;
use crate::{Bar, BarType, OhlcExt, Sentiment};

// ============================================================
// GENERATION AREA
// ============================================================

/// Upper edge of the area single bars are drawn in
pub const GEN_MAX: f64 = 90.0;
/// Lower edge of the area single bars are drawn in
pub const GEN_MIN: f64 = -90.0;
/// Height of the generation area
pub const WORLD_RANGE: f64 = GEN_MAX - GEN_MIN;

// ============================================================
// RANDOM RANGES
// ============================================================

/// Wick padding beyond open/close on ordinary bars
pub const WICK_PAD: (f64, f64) = (0.5, 4.0);
/// How far a reversal bar's wick sweeps past the level it tests
pub const SWEEP_PAD: (f64, f64) = (2.0, 8.0);
/// Distance a reversal close clears its level by
pub const CLEAR_MARGIN: (f64, f64) = (2.0, 10.0);
/// Distance a failed reversal closes short of its level
pub const FAIL_MARGIN: (f64, f64) = (-8.0, -2.0);
/// Gap kept between an approach close and the level it approaches
pub const APPROACH_BUFFER: (f64, f64) = (0.5, 3.0);

/// Mother bar span
pub const MOTHER_SPAN: (f64, f64) = (80.0, 120.0);
/// Mother bar distance from the generation edges
pub const MOTHER_MARGIN: f64 = 40.0;
/// Inside bar span as a fraction of the mother span
pub const INSIDE_SPAN_RATIO: (f64, f64) = (0.2, 0.7);

#[inline]
pub(crate) fn draw<R: RandomSource + ?Sized>(rng: &mut R, range: (f64, f64)) -> f64 {
    rng.uniform(range.0, range.1)
}

// ============================================================
// BAR PRIMITIVES
// ============================================================

/// Bar from open and close with both wicks padded by [`WICK_PAD`]
pub fn padded_bar<R: RandomSource + ?Sized>(
    rng: &mut R,
    open: f64,
    close: f64,
    kind: BarType,
) -> Bar {
    let high = open.max(close) + draw(rng, WICK_PAD);
    let low = open.min(close) - draw(rng, WICK_PAD);
    Bar::new(open, high, low, close, kind)
}

/// Plain bar moving from `open` by `step` (signed)
#[inline]
pub fn step_bar<R: RandomSource + ?Sized>(rng: &mut R, open: f64, step: f64) -> Bar {
    padded_bar(rng, open, open + step, BarType::Other)
}

/// Plain bar heading toward `level` by a step drawn from `step`, closing short of it.
///
/// `heading` is the direction of travel. The close stops an [`APPROACH_BUFFER`]
/// before the level; a bar that opens inside the buffer closes flat.
pub fn approach_bar<R: RandomSource + ?Sized>(
    rng: &mut R,
    open: f64,
    level: f64,
    heading: Sentiment,
    step: (f64, f64),
) -> Bar {
    let sign = heading.sign();
    let target = open + sign * draw(rng, step);
    let stop = level - sign * draw(rng, APPROACH_BUFFER);
    let close = match heading {
        Sentiment::Bullish => target.min(stop.max(open)),
        Sentiment::Bearish => target.max(stop.min(open)),
    };
    padded_bar(rng, open, close, BarType::Other)
}

/// Bar from `open` to `close` with a wick drawn from `long` on `side`
/// and an ordinary [`WICK_PAD`] wick on the other side
pub fn extended_bar<R: RandomSource + ?Sized>(
    rng: &mut R,
    open: f64,
    close: f64,
    side: Sentiment,
    long: (f64, f64),
) -> Bar {
    let long = draw(rng, long);
    let short = draw(rng, WICK_PAD);
    let (up, down) = match side {
        Sentiment::Bullish => (long, short),
        Sentiment::Bearish => (short, long),
    };
    Bar::new(open, open.max(close) + up, open.min(close) - down, close, BarType::Other)
}

/// Mother bar: span 80-120 kept 40 points away from the generation edges
pub fn mother_bar<R: RandomSource + ?Sized>(rng: &mut R) -> Bar {
    let span = draw(rng, MOTHER_SPAN);
    let low = rng.uniform(GEN_MIN + MOTHER_MARGIN, GEN_MAX - span - MOTHER_MARGIN);
    let high = low + span;
    let open = rng.uniform(low, high);
    let close = rng.uniform(low, high);
    Bar::new(open, high, low, close, BarType::Other)
}

/// Inside bar fully contained in `mother`'s range
pub fn inside_bar<R: RandomSource + ?Sized>(rng: &mut R, mother: &Bar) -> Bar {
    let mother_span = mother.range();
    let span = mother_span * draw(rng, INSIDE_SPAN_RATIO);
    let high = rng.uniform(mother.low + span, mother.high);
    let low = high - span;
    let open = rng.uniform(low, high);
    let close = rng.uniform(low, high);
    Bar::new(open, high, low, close, BarType::Other)
}

// ============================================================
// REPOSITIONING
// ============================================================

/// Drift of a small-bodied close away from the open
pub const CLOSE_DRIFT: (f64, f64) = (-3.0, 3.0);
/// Slack on top of the smallest range a reshaped bar needs
const RANGE_SLACK: (f64, f64) = (1.0, 1.15);
/// Where a reshaped ice cream close sits inside its top third, from the high
const ICE_CREAM_TOP: (f64, f64) = (0.0, 0.5);
/// Body ratio bounds kept when reshaping a pin
const PIN_RATIO: (f64, f64) = (0.05, 1.0 / 3.0);
/// Body ratio bounds kept when reshaping a mark
const MARK_RATIO: (f64, f64) = (2.0 / 3.0, 0.75);
const OTHER_MIN_SPAN: f64 = 6.0;

/// Side of `bound` the close must land on, in the rising frame
#[derive(Debug, Clone, Copy)]
struct CloseRule {
    bound: f64,
    clears: bool,
}

impl CloseRule {
    fn apply(self, close: f64) -> f64 {
        if self.clears {
            close.max(self.bound)
        } else {
            close.min(self.bound)
        }
    }

    fn admits(self, close: f64) -> bool {
        if self.clears {
            close >= self.bound
        } else {
            close <= self.bound
        }
    }
}

/// Reshape `template` so it continues from `open` and closes relative to `level`.
///
/// The close lands at least `margin` past `level` in `direction`; a negative
/// range makes the bar fail to clear the level. The wick against `direction`
/// sweeps past both the open and the level by [`SWEEP_PAD`]. The template's
/// kind and body proportion are kept, so the result still reads as the same
/// Exe bar in the same direction. Ice cream and mark bodies must move with
/// `direction`; when the close rule forbids that, the bar becomes a pin.
pub fn continue_from<R: RandomSource + ?Sized>(
    rng: &mut R,
    template: &Bar,
    open: f64,
    level: f64,
    direction: Sentiment,
    margin: (f64, f64),
) -> Bar {
    reposition(rng, template.kind, template.body_ratio(), open, level, direction, margin)
}

/// Non-Exe counterpart of [`continue_from`]: same close rule and sweep, with a
/// small body in the middle third.
pub fn plain_from<R: RandomSource + ?Sized>(
    rng: &mut R,
    open: f64,
    level: f64,
    direction: Sentiment,
    margin: (f64, f64),
) -> Bar {
    reposition(rng, BarType::Other, None, open, level, direction, margin)
}

/// Bar that runs through `level` with the close `margin` past it and a short
/// far wick. Shape is not classified.
pub fn breakout_bar<R: RandomSource + ?Sized>(
    rng: &mut R,
    open: f64,
    level: f64,
    direction: Sentiment,
    margin: (f64, f64),
) -> Bar {
    let close = level + direction.sign() * draw(rng, margin);
    let sweep = draw(rng, SWEEP_PAD);
    let pad = draw(rng, WICK_PAD);
    let (high, low) = match direction {
        Sentiment::Bullish => (open.max(close) + pad, open.min(close).min(level) - sweep),
        Sentiment::Bearish => (open.max(close).max(level) + sweep, open.min(close) - pad),
    };
    Bar::new(open, high, low, close, BarType::Other)
}

/// Bars are built rising (bullish) and mirrored through zero for bearish.
fn reposition<R: RandomSource + ?Sized>(
    rng: &mut R,
    kind: BarType,
    body_ratio: Option<f64>,
    open: f64,
    level: f64,
    direction: Sentiment,
    margin: (f64, f64),
) -> Bar {
    let sign = direction.sign();
    let (open, level) = (sign * open, sign * level);
    let margin = draw(rng, margin);
    let rule = CloseRule {
        bound: level + margin,
        clears: margin >= 0.0,
    };
    let floor = open.min(level) - draw(rng, SWEEP_PAD);

    let pin_ratio = body_ratio.unwrap_or(PIN_RATIO.1).clamp(PIN_RATIO.0, PIN_RATIO.1);
    let bar = match kind {
        BarType::Pin => rising_pin(rng, open, floor, rule, pin_ratio),
        BarType::IceCream => rising_ice_cream(rng, open, floor, rule)
            .unwrap_or_else(|| rising_pin(rng, open, floor, rule, PIN_RATIO.1)),
        BarType::Mark => {
            let ratio = body_ratio.unwrap_or(MARK_RATIO.0).clamp(MARK_RATIO.0, MARK_RATIO.1);
            rising_mark(rng, open, floor, rule, ratio)
                .unwrap_or_else(|| rising_pin(rng, open, floor, rule, PIN_RATIO.1))
        }
        BarType::Other => rising_other(rng, open, floor, rule),
    };
    orient(bar, direction)
}

fn orient(bar: Bar, direction: Sentiment) -> Bar {
    match direction {
        Sentiment::Bullish => bar,
        Sentiment::Bearish => Bar::new(-bar.open, -bar.low, -bar.high, -bar.close, bar.kind),
    }
}

/// Body on the high, lower wick reaching `floor` or further
fn rising_pin<R: RandomSource + ?Sized>(
    rng: &mut R,
    open: f64,
    floor: f64,
    rule: CloseRule,
    body_ratio: f64,
) -> Bar {
    let close = rule.apply(open + draw(rng, CLOSE_DRIFT));
    let high = open.max(close);
    let range = ((close - open).abs() / body_ratio).max(high - floor);
    Bar::new(open, high, high - range, close, BarType::Pin)
}

/// Half-range rising body with the close in the top third
fn rising_ice_cream<R: RandomSource + ?Sized>(
    rng: &mut R,
    open: f64,
    floor: f64,
    rule: CloseRule,
) -> Option<Bar> {
    let top = draw(rng, ICE_CREAM_TOP);
    let mut range = (open - floor) / (0.5 - top / 3.0);
    if rule.clears {
        range = range.max(2.0 * (rule.bound - open));
    }
    let range = range * draw(rng, RANGE_SLACK);
    let close = open + range / 2.0;
    if !rule.admits(close) {
        return None;
    }
    let high = close + top * range / 3.0;
    Some(Bar::new(open, high, high - range, close, BarType::IceCream))
}

/// Rising body of `body_ratio` of the range, lower wick reaching `floor`
fn rising_mark<R: RandomSource + ?Sized>(
    rng: &mut R,
    open: f64,
    floor: f64,
    rule: CloseRule,
    body_ratio: f64,
) -> Option<Bar> {
    let reach = open - floor;
    let mut range = reach / (1.0 - body_ratio);
    if rule.clears {
        range = range.max((rule.bound - open) / body_ratio);
    }
    let range = range * draw(rng, RANGE_SLACK);
    let close = open + body_ratio * range;
    if !rule.admits(close) {
        return None;
    }
    let low = open - rng.uniform(reach, (1.0 - body_ratio) * range);
    Some(Bar::new(open, low + range, low, close, BarType::Mark))
}

/// Body at most a quarter of the range, inside the middle third
fn rising_other<R: RandomSource + ?Sized>(
    rng: &mut R,
    open: f64,
    floor: f64,
    rule: CloseRule,
) -> Bar {
    let close = rule.apply(open + draw(rng, CLOSE_DRIFT));
    let body = (close - open).abs();
    let bottom = open.min(close);
    let reach = bottom - floor;
    let range = (4.0 * body).max(1.5 * (reach + body)).max(OTHER_MIN_SPAN)
        * draw(rng, RANGE_SLACK);
    let below = rng.uniform((range / 3.0).max(reach), 2.0 * range / 3.0 - body);
    let low = bottom - below;
    Bar::new(open, low + range, low, close, BarType::Other)
}

/// Extreme of `bar` on the `side` of travel: high when bullish, low when bearish
#[inline]
pub fn extreme(bar: &Bar, side: Sentiment) -> f64 {
    match side {
        Sentiment::Bullish => bar.high,
        Sentiment::Bearish => bar.low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;

    fn consistent(bar: &Bar) -> bool {
        bar.low <= bar.body_bottom() && bar.high >= bar.body_top()
    }

    #[test]
    fn test_mother_and_inside_containment() {
        let mut rng = seeded(21);
        for _ in 0..500 {
            let mother = mother_bar(&mut rng);
            let span = mother.range();
            assert!((80.0..=120.0).contains(&span));
            assert!(consistent(&mother));

            let inside = inside_bar(&mut rng, &mother);
            assert!(inside.high <= mother.high + 1e-9);
            assert!(inside.low >= mother.low - 1e-9);
            assert!(inside.range() >= span * 0.2 - 1e-9);
            assert!(inside.range() <= span * 0.7 + 1e-9);
            assert!(consistent(&inside));
        }
    }

    #[test]
    fn test_approach_bar_never_crosses() {
        let mut rng = seeded(22);
        for _ in 0..500 {
            let open = rng.uniform(-20.0, 20.0);
            let down = approach_bar(&mut rng, open, -30.0, Sentiment::Bearish, (5.0, 15.0));
            assert!(down.close > -30.0);
            assert!(down.close <= open);
            assert!(consistent(&down));

            let up = approach_bar(&mut rng, open, 30.0, Sentiment::Bullish, (5.0, 15.0));
            assert!(up.close < 30.0);
            assert!(up.close >= open);
        }
    }

    const EPS: f64 = 1e-9;

    fn templates() -> [Bar; 3] {
        [
            Bar::new(10.0, 10.0, -20.0, 8.0, BarType::Pin),
            Bar::new(-12.0, 15.0, -15.0, 12.0, BarType::Mark),
            Bar::new(-5.0, 15.0, -15.0, 10.0, BarType::IceCream),
        ]
    }

    /// Exe shape rules read in `direction`, on the bar mirrored to rising
    fn reads_as_exe(bar: &Bar, direction: Sentiment) -> bool {
        let bar = match direction {
            Sentiment::Bullish => *bar,
            Sentiment::Bearish => {
                Bar::new(-bar.open, -bar.low, -bar.high, -bar.close, bar.kind)
            }
        };
        let range = bar.range();
        let close_high = bar.close >= bar.high - range / 3.0 - EPS;
        match bar.kind {
            BarType::Pin => {
                bar.body_top() == bar.high && bar.body_bottom() >= bar.high - range / 3.0 - EPS
            }
            BarType::Mark => bar.is_bullish() && bar.body() >= 2.0 / 3.0 * range - EPS,
            BarType::IceCream => close_high && (bar.body() - range / 2.0).abs() < EPS,
            BarType::Other => false,
        }
    }

    #[test]
    fn test_continue_from_clears_level() {
        let mut rng = seeded(23);
        for _ in 0..300 {
            for template in templates() {
                let bull = continue_from(
                    &mut rng,
                    &template,
                    -40.0,
                    -50.0,
                    Sentiment::Bullish,
                    CLEAR_MARGIN,
                );
                assert_eq!(bull.open, -40.0);
                assert!(bull.close >= -48.0 - EPS);
                assert!(bull.low < -50.0);
                assert_eq!(bull.kind, template.kind);
                assert!(consistent(&bull));

                let bear = continue_from(
                    &mut rng,
                    &template,
                    40.0,
                    50.0,
                    Sentiment::Bearish,
                    CLEAR_MARGIN,
                );
                assert!(bear.close <= 48.0 + EPS);
                assert!(bear.high > 50.0);
                assert_eq!(bear.kind, template.kind);
            }
        }
    }

    #[test]
    fn test_continue_from_keeps_exe_reading() {
        let mut rng = seeded(25);
        for _ in 0..300 {
            for template in templates() {
                let bull = continue_from(
                    &mut rng,
                    &template,
                    -35.0,
                    -50.0,
                    Sentiment::Bullish,
                    CLEAR_MARGIN,
                );
                assert!(reads_as_exe(&bull, Sentiment::Bullish), "{bull:?}");
                assert!(bull.close_position().unwrap() >= 2.0 / 3.0 - EPS);

                let bear = continue_from(
                    &mut rng,
                    &template,
                    35.0,
                    50.0,
                    Sentiment::Bearish,
                    CLEAR_MARGIN,
                );
                assert!(reads_as_exe(&bear, Sentiment::Bearish), "{bear:?}");
                assert!(bear.close_position().unwrap() <= 1.0 / 3.0 + EPS);
            }
        }
    }

    #[test]
    fn test_continue_from_breakout_below_level() {
        // opening under the level, as a continuation breakout does
        let mut rng = seeded(28);
        for _ in 0..300 {
            for template in templates() {
                let bar = continue_from(
                    &mut rng,
                    &template,
                    -10.0,
                    0.0,
                    Sentiment::Bullish,
                    CLEAR_MARGIN,
                );
                assert!(bar.close >= 2.0 - EPS);
                assert!(bar.low <= -12.0 + EPS);
                assert_eq!(bar.kind, template.kind);
                assert!(reads_as_exe(&bar, Sentiment::Bullish), "{bar:?}");
            }
        }
    }

    #[test]
    fn test_continue_from_failing_margin() {
        let mut rng = seeded(24);
        for _ in 0..200 {
            for template in templates() {
                let bar = continue_from(
                    &mut rng,
                    &template,
                    -40.0,
                    -50.0,
                    Sentiment::Bullish,
                    FAIL_MARGIN,
                );
                assert!(bar.close <= -52.0 + EPS);
                assert!(consistent(&bar));
                // a rising body cannot close under its own open
                assert_eq!(bar.kind, BarType::Pin);
                assert!(reads_as_exe(&bar, Sentiment::Bullish), "{bar:?}");
            }
        }
    }

    #[test]
    fn test_plain_from_is_indecisive() {
        let mut rng = seeded(26);
        for _ in 0..300 {
            let bar = plain_from(&mut rng, 65.0, 50.0, Sentiment::Bearish, CLEAR_MARGIN);
            assert_eq!(bar.kind, BarType::Other);
            assert!(bar.close <= 48.0 + EPS);
            assert!(bar.high > 65.0);
            assert!(consistent(&bar));

            let range = bar.range();
            assert!(bar.body() <= range / 4.0 + EPS);
            assert!(bar.body_bottom() >= bar.low + range / 3.0 - EPS);
            assert!(bar.body_top() <= bar.high - range / 3.0 + EPS);
        }
    }

    #[test]
    fn test_breakout_bar_runs_through_level() {
        let mut rng = seeded(29);
        for _ in 0..200 {
            let bar = breakout_bar(&mut rng, 55.0, 50.0, Sentiment::Bullish, FAIL_MARGIN);
            assert!(bar.close < 50.0 && bar.low < bar.close);
            assert!(bar.high > 55.0);
            assert!(consistent(&bar));
        }
    }

    #[test]
    fn test_extended_bar_sides() {
        let mut rng = seeded(27);
        for _ in 0..200 {
            let down = extended_bar(&mut rng, 10.0, 5.0, Sentiment::Bearish, (8.0, 15.0));
            assert!(down.low <= 5.0 - 8.0 && down.low > 5.0 - 15.0);
            assert!(down.high > 10.0 && down.high <= 14.0);

            let up = extended_bar(&mut rng, 10.0, 5.0, Sentiment::Bullish, (8.0, 15.0));
            assert!(up.high >= 18.0 && up.high < 25.0);
        }
    }

}
