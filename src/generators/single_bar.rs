//! Single-bar generators
//!
//! Bar types: Pin, Mark (up/down), Ice Cream, Other. Pin, Mark and Ice Cream are
//! the Exe (actionable) types.
//!
//! Geometry satisfies the classification rule by construction; no verification
//! pass runs on single bars.
//!
//! - **Pin**: sentiment is the body's position. The body sits in the top third
//!   (bullish) or bottom third (bearish) with its outer edge on the extreme.
//! - **Mark**: sentiment is the body's colour. Body is at least 2/3 of the range.
//! - **Ice Cream**: sentiment is the close's position. Body is half the range,
//!   close in the top third (bullish) or bottom third (bearish).
//! - **Other**: small body in the middle third.

use super::helpers::{draw, GEN_MAX, GEN_MIN, WORLD_RANGE};
use crate::random::RandomSource;
use crate::{Bar, BarType, Sentiment};

const PIN_SPAN: (f64, f64) = (WORLD_RANGE * 0.5, WORLD_RANGE * 0.9);
/// Pin body as a fraction of the one-third band
const PIN_BODY_RATIO: (f64, f64) = (0.15, 1.0);
const MARK_SPAN: (f64, f64) = (WORLD_RANGE * 0.7, WORLD_RANGE * 0.95);
const MARK_BODY_RATIO: (f64, f64) = (2.0 / 3.0, 0.9);
const ICE_CREAM_SPAN: (f64, f64) = (WORLD_RANGE * 0.5, WORLD_RANGE * 0.9);
const OTHER_SPAN: (f64, f64) = (WORLD_RANGE * 0.3, WORLD_RANGE * 0.6);
const OTHER_BODY_RATIO: (f64, f64) = (0.05, 0.25);

/// Draw a span and place it inside the generation area. Returns `(low, high)`.
fn place<R: RandomSource + ?Sized>(rng: &mut R, span: (f64, f64)) -> (f64, f64) {
    let range = draw(rng, span);
    let low = rng.uniform(GEN_MIN, GEN_MAX - range);
    (low, low + range)
}

/// Open/close for a body between `bottom` and `top`, colour decided by a coin flip
fn coloured<R: RandomSource + ?Sized>(rng: &mut R, bottom: f64, top: f64) -> (f64, f64) {
    if rng.chance(0.5) {
        (bottom, top)
    } else {
        (top, bottom)
    }
}

// ============================================================
// EXE BARS
// ============================================================

/// Pin bar
pub fn pin<R: RandomSource + ?Sized>(rng: &mut R, sentiment: Sentiment) -> Bar {
    let (low, high) = place(rng, PIN_SPAN);
    let third = (high - low) / 3.0;
    let body = third * draw(rng, PIN_BODY_RATIO);

    let (bottom, top) = match sentiment {
        Sentiment::Bullish => (high - body, high),
        Sentiment::Bearish => (low, low + body),
    };
    let (open, close) = coloured(rng, bottom, top);

    Bar::new(open, high, low, close, BarType::Pin)
}

/// Mark up (bullish) / mark down (bearish) bar
pub fn mark<R: RandomSource + ?Sized>(rng: &mut R, sentiment: Sentiment) -> Bar {
    let (low, high) = place(rng, MARK_SPAN);
    let body = (high - low) * draw(rng, MARK_BODY_RATIO);

    let (open, close) = match sentiment {
        Sentiment::Bullish => {
            let open = rng.uniform(low, high - body);
            (open, open + body)
        }
        Sentiment::Bearish => {
            let open = rng.uniform(low + body, high);
            (open, open - body)
        }
    };

    Bar::new(open, high, low, close, BarType::Mark)
}

/// Ice cream bar
///
/// A half-range body with the close in the outer third only fits on one side
/// of the close, so body colour follows sentiment.
pub fn ice_cream<R: RandomSource + ?Sized>(rng: &mut R, sentiment: Sentiment) -> Bar {
    let (low, high) = place(rng, ICE_CREAM_SPAN);
    let range = high - low;
    let body = range / 2.0;

    let (open, close) = match sentiment {
        Sentiment::Bullish => {
            let close = rng.uniform(high - range / 3.0, high);
            (close - body, close)
        }
        Sentiment::Bearish => {
            let close = rng.uniform(low, low + range / 3.0);
            (close + body, close)
        }
    };

    Bar::new(open, high, low, close, BarType::IceCream)
}

/// Uniform choice among pin, mark and ice cream
pub fn exe<R: RandomSource + ?Sized>(rng: &mut R, sentiment: Sentiment) -> Bar {
    match rng.pick(BarType::EXE.len()) {
        0 => pin(rng, sentiment),
        1 => mark(rng, sentiment),
        _ => ice_cream(rng, sentiment),
    }
}

// ============================================================
// NON-EXE BARS
// ============================================================

/// Indecisive bar: body 5-25% of the range inside the middle third
pub fn other<R: RandomSource + ?Sized>(rng: &mut R) -> Bar {
    let (low, high) = place(rng, OTHER_SPAN);
    let range = high - low;
    let body = range * draw(rng, OTHER_BODY_RATIO);

    let bottom = rng.uniform(low + range / 3.0, high - range / 3.0 - body);
    let (open, close) = coloured(rng, bottom, bottom + body);

    Bar::new(open, high, low, close, BarType::Other)
}

/// Exe bar with a random sentiment or an Other bar, 50/50
pub fn random_bar<R: RandomSource + ?Sized>(rng: &mut R) -> Bar {
    if rng.chance(0.5) {
        let sentiment = rng.sentiment();
        exe(rng, sentiment)
    } else {
        other(rng)
    }
}

/// Bar of a chosen type. `sentiment` is ignored for [`BarType::Other`].
pub fn forced<R: RandomSource + ?Sized>(rng: &mut R, kind: BarType, sentiment: Sentiment) -> Bar {
    match kind {
        BarType::Pin => pin(rng, sentiment),
        BarType::Mark => mark(rng, sentiment),
        BarType::IceCream => ice_cream(rng, sentiment),
        BarType::Other => other(rng),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::seeded;
    use crate::OhlcExt;

    const EPS: f64 = 1e-9;

    /// Returns the lower bound of every draw.
    struct Floor;

    impl RandomSource for Floor {
        fn uniform(&mut self, min: f64, _max: f64) -> f64 {
            min
        }
    }

    fn assert_consistent(bar: &Bar) {
        assert!(bar.low <= bar.body_bottom(), "{bar:?}");
        assert!(bar.high >= bar.body_top(), "{bar:?}");
        assert!(bar.low >= GEN_MIN - EPS && bar.high <= GEN_MAX + EPS, "{bar:?}");
    }

    #[test]
    fn test_pin_bullish_body_in_top_third() {
        let mut rng = seeded(1);
        for _ in 0..1000 {
            let bar = pin(&mut rng, Sentiment::Bullish);
            assert_consistent(&bar);
            assert_eq!(bar.kind, BarType::Pin);
            assert_eq!(bar.body_top(), bar.high);
            assert!(bar.body_bottom() >= bar.high - bar.range() / 3.0 - EPS);
        }
    }

    #[test]
    fn test_pin_bearish_body_in_bottom_third() {
        let mut rng = seeded(2);
        for _ in 0..1000 {
            let bar = pin(&mut rng, Sentiment::Bearish);
            assert_consistent(&bar);
            assert_eq!(bar.body_bottom(), bar.low);
            assert!(bar.body_top() <= bar.low + bar.range() / 3.0 + EPS);
        }
    }

    #[test]
    fn test_pin_with_floor_source() {
        let bar = pin(&mut Floor, Sentiment::Bullish);
        assert!(bar.low < bar.body_bottom());
        assert!(bar.body_bottom() < bar.body_top());
        assert_eq!(bar.body_top(), bar.high);
    }

    #[test]
    fn test_mark_body_covers_two_thirds() {
        let mut rng = seeded(3);
        for _ in 0..1000 {
            let up = mark(&mut rng, Sentiment::Bullish);
            assert_consistent(&up);
            assert!(up.close > up.open);
            assert!(up.close - up.open >= 2.0 / 3.0 * up.range() - EPS);

            let down = mark(&mut rng, Sentiment::Bearish);
            assert_consistent(&down);
            assert!(down.close < down.open);
            assert!(down.open - down.close >= 2.0 / 3.0 * down.range() - EPS);
        }
    }

    #[test]
    fn test_ice_cream_close_position() {
        let mut rng = seeded(4);
        for _ in 0..1000 {
            let up = ice_cream(&mut rng, Sentiment::Bullish);
            assert_consistent(&up);
            assert!(up.close >= up.high - up.range() / 3.0 - EPS);
            assert!((up.body() - up.range() / 2.0).abs() < EPS);

            let down = ice_cream(&mut rng, Sentiment::Bearish);
            assert_consistent(&down);
            assert!(down.close <= down.low + down.range() / 3.0 + EPS);
        }
    }

    #[test]
    fn test_other_small_centered_body() {
        let mut rng = seeded(5);
        let mut saw_red = false;
        let mut saw_green = false;
        for _ in 0..1000 {
            let bar = other(&mut rng);
            assert_consistent(&bar);
            assert_eq!(bar.kind, BarType::Other);
            assert!(bar.body() <= 0.25 * bar.range() + EPS);
            assert!(bar.body_bottom() >= bar.low + bar.range() / 3.0 - EPS);
            assert!(bar.body_top() <= bar.high - bar.range() / 3.0 + EPS);
            saw_red |= bar.is_bearish();
            saw_green |= bar.is_bullish();
        }
        assert!(saw_red && saw_green);
    }

    #[test]
    fn test_exe_covers_all_types() {
        let mut rng = seeded(6);
        let mut seen = [false; 3];
        for _ in 0..300 {
            let bar = exe(&mut rng, Sentiment::Bullish);
            assert!(bar.kind.is_exe());
            let i = BarType::EXE.iter().position(|t| *t == bar.kind).unwrap();
            seen[i] = true;
        }
        assert_eq!(seen, [true; 3]);
    }

    #[test]
    fn test_random_bar_mix() {
        let mut rng = seeded(7);
        let exe_count = (0..2000)
            .map(|_| random_bar(&mut rng))
            .filter(|b| b.kind.is_exe())
            .count();
        assert!((800..=1200).contains(&exe_count), "{exe_count}");
    }

    #[test]
    fn test_forced_dispatch() {
        let mut rng = seeded(8);
        for kind in [BarType::Pin, BarType::Mark, BarType::IceCream, BarType::Other] {
            assert_eq!(forced(&mut rng, kind, Sentiment::Bullish).kind, kind);
        }
    }
}
