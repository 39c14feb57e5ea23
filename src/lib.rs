//! # pagen - Price-Action Pattern Generator
//!
//! Procedural generator of labeled OHLC bars and multi-bar chart patterns for
//! pattern-recognition training. Every example is built so its geometry matches
//! its label, including deliberately flawed negative examples labeled `Other`.
//!
//! ## Quick Start
//!
//! ```rust
//! use pagen::prelude::*;
//!
//! let generator = GeneratorBuilder::new()
//!     .max_attempts(30)
//!     .build()
//!     .unwrap();
//!
//! let mut rng = seeded(42);
//! let sampled = generator.generate(&mut rng, Request::BaseForceStrike);
//! let pattern = sampled.value().as_pattern().unwrap();
//! assert!(!pattern.bars.is_empty());
//! ```

pub mod config;
pub mod generators;
pub mod indicators;
pub mod random;

pub mod prelude {
    pub use crate::{
        // Config
        config::{FlawChances, GeneratorConfig, PriceBounds},
        // Generators
        generators::*,
        // Indicators
        indicators::{sma, TrendIndicators},
        // Randomness
        random::{seeded, RandomSource},
        // Sampling
        sample_until,
        // Types
        Bar,
        BarType,
        Blueprint,
        BoundsValidator,
        Candidate,
        Generated,
        GeneratorBuilder,
        Level,
        OhlcExt,
        Pattern,
        // Errors
        PatternError,
        PatternGenerator,
        PatternType,
        Ratio,
        Request,
        Result,
        Sampled,
        Sentiment,
        Validator,
        Ohlc,
    };
}

use serde::{Deserialize, Serialize};

use config::{GeneratorConfig, PriceBounds};
use generators::{continuation, force_strike, reversal, single_bar};
use random::RandomSource;

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, PatternError>;

/// Errors from configuring the generator or validating bars
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid bar at index {index}: {reason}")]
    InvalidBar { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Probability in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(PatternError::InvalidValue(
                "Ratio cannot be NaN or infinite",
            ));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(PatternError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLC TRAITS
// ============================================================

/// Core OHLC data trait
pub trait Ohlc {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
}

/// Extension trait with computed properties for OHLC data
pub trait OhlcExt: Ohlc {
    #[inline]
    fn body(&self) -> f64 {
        (self.close() - self.open()).abs()
    }

    #[inline]
    fn range(&self) -> f64 {
        self.high() - self.low()
    }

    #[inline]
    fn body_top(&self) -> f64 {
        self.open().max(self.close())
    }

    #[inline]
    fn body_bottom(&self) -> f64 {
        self.open().min(self.close())
    }

    #[inline]
    fn upper_shadow(&self) -> f64 {
        self.high() - self.body_top()
    }

    #[inline]
    fn lower_shadow(&self) -> f64 {
        self.body_bottom() - self.low()
    }

    #[inline]
    fn is_bullish(&self) -> bool {
        self.close() > self.open()
    }

    #[inline]
    fn is_bearish(&self) -> bool {
        self.close() < self.open()
    }

    /// Body as ratio of range. Returns None if range ≈ 0
    #[inline]
    fn body_ratio(&self) -> Option<f64> {
        let range = self.range();
        (range > f64::EPSILON).then(|| self.body() / range)
    }

    /// Position of the close inside the range, 0.0 at the low and 1.0 at the high
    #[inline]
    fn close_position(&self) -> Option<f64> {
        let range = self.range();
        (range > f64::EPSILON).then(|| (self.close() - self.low()) / range)
    }

    /// Validate OHLC data consistency
    fn validate(&self) -> Result<()> {
        let values = [self.open(), self.high(), self.low(), self.close()];
        if values.iter().any(|v| v.is_nan()) {
            return Err(PatternError::InvalidBar {
                index: 0,
                reason: "NaN in OHLC",
            });
        }
        if values.iter().any(|v| v.is_infinite()) {
            return Err(PatternError::InvalidBar {
                index: 0,
                reason: "Infinite value in OHLC",
            });
        }
        if self.low() > self.body_bottom() {
            return Err(PatternError::InvalidBar {
                index: 0,
                reason: "low above body",
            });
        }
        if self.high() < self.body_top() {
            return Err(PatternError::InvalidBar {
                index: 0,
                reason: "high below body",
            });
        }
        Ok(())
    }
}

impl<T: Ohlc + ?Sized> OhlcExt for T {}

// ============================================================
// SENTIMENT
// ============================================================

/// Intended directional meaning of a bar or pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sentiment {
    Bullish,
    Bearish,
}

impl Sentiment {
    #[inline]
    pub fn from_bullish(is_bullish: bool) -> Self {
        if is_bullish {
            Sentiment::Bullish
        } else {
            Sentiment::Bearish
        }
    }

    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Sentiment::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Sentiment::Bearish)
    }

    /// +1.0 for bullish, -1.0 for bearish
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Sentiment::Bullish => 1.0,
            Sentiment::Bearish => -1.0,
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            Sentiment::Bullish => Sentiment::Bearish,
            Sentiment::Bearish => Sentiment::Bullish,
        }
    }
}

// ============================================================
// BAR
// ============================================================

/// Single-bar classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BarType {
    Pin,
    Mark,
    IceCream,
    Other,
}

impl BarType {
    /// Actionable signal bar types
    pub const EXE: [BarType; 3] = [BarType::Pin, BarType::Mark, BarType::IceCream];

    #[inline]
    pub fn is_exe(self) -> bool {
        !matches!(self, BarType::Other)
    }

    pub fn name(self) -> &'static str {
        match self {
            BarType::Pin => "Pin Bar",
            BarType::Mark => "Mark Up/Down Bar",
            BarType::IceCream => "Ice Cream Bar",
            BarType::Other => "Other",
        }
    }
}

impl std::fmt::Display for BarType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One generated OHLC bar with its classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub kind: BarType,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64, kind: BarType) -> Self {
        Self {
            open,
            high,
            low,
            close,
            kind,
        }
    }
}

impl Ohlc for Bar {
    #[inline]
    fn open(&self) -> f64 {
        self.open
    }

    #[inline]
    fn high(&self) -> f64 {
        self.high
    }

    #[inline]
    fn low(&self) -> f64 {
        self.low
    }

    #[inline]
    fn close(&self) -> f64 {
        self.close
    }
}

// ============================================================
// PATTERN
// ============================================================

/// Pattern classification - closed set, `Other` is the universal negative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternType {
    BullishForceStrike,
    BearishForceStrike,
    UpsideReversal1,
    DownsideReversal1,
    UpsideContinuation1,
    DownsideContinuation1,
    Other,
}

impl PatternType {
    #[inline]
    pub fn force_strike(sentiment: Sentiment) -> Self {
        match sentiment {
            Sentiment::Bullish => PatternType::BullishForceStrike,
            Sentiment::Bearish => PatternType::BearishForceStrike,
        }
    }

    /// Reversal1 labels are swapped relative to the generating branch:
    /// the bullish construction is answered as `DownsideReversal1`.
    #[inline]
    pub fn reversal1(sentiment: Sentiment) -> Self {
        match sentiment {
            Sentiment::Bullish => PatternType::DownsideReversal1,
            Sentiment::Bearish => PatternType::UpsideReversal1,
        }
    }

    #[inline]
    pub fn continuation1(sentiment: Sentiment) -> Self {
        match sentiment {
            Sentiment::Bullish => PatternType::UpsideContinuation1,
            Sentiment::Bearish => PatternType::DownsideContinuation1,
        }
    }

    #[inline]
    pub fn is_other(self) -> bool {
        matches!(self, PatternType::Other)
    }

    pub fn name(self) -> &'static str {
        match self {
            PatternType::BullishForceStrike => "Bullish Force Strike",
            PatternType::BearishForceStrike => "Bearish Force Strike",
            PatternType::UpsideReversal1 => "Upside Reversal 1",
            PatternType::DownsideReversal1 => "Downside Reversal 1",
            PatternType::UpsideContinuation1 => "Upside Continuation 1",
            PatternType::DownsideContinuation1 => "Downside Continuation 1",
            PatternType::Other => "Other Pattern",
        }
    }
}

impl std::fmt::Display for PatternType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Reference price paired with the index of the bar that established it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub price: f64,
    pub source_index: usize,
}

impl Level {
    pub fn new(price: f64, source_index: usize) -> Self {
        Self {
            price,
            source_index,
        }
    }
}

/// Labeled bar sequence, index 0 is the earliest bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub bars: Vec<Bar>,
    pub label: PatternType,
    pub primary_level: Option<Level>,
    pub secondary_level: Option<Level>,
    pub indicators: Option<indicators::TrendIndicators>,
}

impl Pattern {
    pub fn new(bars: Vec<Bar>, label: PatternType) -> Self {
        Self {
            bars,
            label,
            primary_level: None,
            secondary_level: None,
            indicators: None,
        }
    }

    pub fn with_primary_level(mut self, level: Level) -> Self {
        self.primary_level = Some(level);
        self
    }

    pub fn with_secondary_level(mut self, level: Level) -> Self {
        self.secondary_level = Some(level);
        self
    }

    pub fn with_indicators(mut self, indicators: indicators::TrendIndicators) -> Self {
        self.indicators = Some(indicators);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Level annotations in order (primary first)
    pub fn levels(&self) -> impl Iterator<Item = &Level> {
        self.primary_level.iter().chain(self.secondary_level.iter())
    }

    /// Check bar consistency and that every level points at a bar
    pub fn validate(&self) -> Result<()> {
        for (i, bar) in self.bars.iter().enumerate() {
            bar.validate().map_err(|e| match e {
                PatternError::InvalidBar { reason, .. } => {
                    PatternError::InvalidBar { index: i, reason }
                }
                other => other,
            })?;
        }
        if let Some(level) = self.levels().find(|l| l.source_index >= self.bars.len()) {
            return Err(PatternError::InvalidBar {
                index: level.source_index,
                reason: "level source index out of bounds",
            });
        }
        Ok(())
    }
}

// ============================================================
// CANDIDATES & VALIDATION
// ============================================================

/// Anything the rejection sampler can bounds-check
pub trait Candidate {
    fn bars(&self) -> &[Bar];
}

impl Candidate for Bar {
    fn bars(&self) -> &[Bar] {
        std::slice::from_ref(self)
    }
}

impl Candidate for Pattern {
    fn bars(&self) -> &[Bar] {
        &self.bars
    }
}

/// Accept/reject gate applied to every candidate
pub trait Validator {
    fn accepts(&self, bars: &[Bar]) -> bool;
}

impl<F: Fn(&[Bar]) -> bool> Validator for F {
    fn accepts(&self, bars: &[Bar]) -> bool {
        self(bars)
    }
}

/// Accepts candidates whose every bar lies inside the visible price range
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoundsValidator {
    pub bounds: PriceBounds,
}

impl BoundsValidator {
    pub fn new(bounds: PriceBounds) -> Self {
        Self { bounds }
    }
}

impl Validator for BoundsValidator {
    fn accepts(&self, bars: &[Bar]) -> bool {
        bars.iter().all(|b| self.bounds.contains(b.low, b.high))
    }
}

// ============================================================
// REJECTION SAMPLING
// ============================================================

/// Outcome of bounded rejection sampling
#[derive(Debug, Clone, PartialEq)]
pub enum Sampled<T> {
    /// The validator accepted the candidate produced on attempt `attempts`.
    Accepted { value: T, attempts: usize },
    /// Every attempt was rejected; `value` is the last candidate, unchecked.
    Exhausted { value: T, attempts: usize },
}

impl<T> Sampled<T> {
    #[inline]
    pub fn value(&self) -> &T {
        match self {
            Sampled::Accepted { value, .. } | Sampled::Exhausted { value, .. } => value,
        }
    }

    #[inline]
    pub fn into_value(self) -> T {
        match self {
            Sampled::Accepted { value, .. } | Sampled::Exhausted { value, .. } => value,
        }
    }

    #[inline]
    pub fn attempts(&self) -> usize {
        match self {
            Sampled::Accepted { attempts, .. } | Sampled::Exhausted { attempts, .. } => *attempts,
        }
    }

    #[inline]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Sampled::Accepted { .. })
    }

    #[inline]
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Sampled::Exhausted { .. })
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sampled<U> {
        match self {
            Sampled::Accepted { value, attempts } => Sampled::Accepted {
                value: f(value),
                attempts,
            },
            Sampled::Exhausted { value, attempts } => Sampled::Exhausted {
                value: f(value),
                attempts,
            },
        }
    }
}

/// Regenerate candidates from scratch until `validator` accepts one.
///
/// At most `max_attempts` candidates are produced (at least one is always
/// produced). When none is accepted the last candidate is returned as
/// [`Sampled::Exhausted`]; no error is raised.
pub fn sample_until<T, V, F>(max_attempts: usize, validator: &V, mut make: F) -> Sampled<T>
where
    T: Candidate,
    V: Validator + ?Sized,
    F: FnMut() -> T,
{
    let mut attempts = 1;
    let mut candidate = make();
    while !validator.accepts(candidate.bars()) {
        if attempts >= max_attempts {
            log::warn!(
                "no candidate accepted after {attempts} attempts, returning last candidate"
            );
            return Sampled::Exhausted {
                value: candidate,
                attempts,
            };
        }
        log::debug!("candidate rejected on attempt {attempts}/{max_attempts}");
        attempts += 1;
        candidate = make();
    }
    Sampled::Accepted {
        value: candidate,
        attempts,
    }
}

// ============================================================
// REQUESTS
// ============================================================

/// What the quiz controller asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Request {
    /// Exe (random sentiment) or Other, 50/50
    RandomBar,
    /// A chosen bar type; `sentiment` is ignored for `Other`
    ForcedBar { kind: BarType, sentiment: Sentiment },
    /// Exe or non-Exe as decided by the controller
    SimpleBar { exe: bool },
    BaseForceStrike,
    ContinuationForceStrike,
    SwingPointForceStrike,
    Reversal1,
    Continuation1,
    /// Uniform over the pattern families, drawn once per request
    ComprehensiveMix,
}

impl Request {
    /// Pattern families drawn by [`Request::ComprehensiveMix`]
    pub const PATTERN_FAMILIES: [Request; 5] = [
        Request::BaseForceStrike,
        Request::ContinuationForceStrike,
        Request::SwingPointForceStrike,
        Request::Reversal1,
        Request::Continuation1,
    ];

    #[inline]
    pub fn is_pattern(self) -> bool {
        !matches!(
            self,
            Request::RandomBar | Request::ForcedBar { .. } | Request::SimpleBar { .. }
        )
    }
}

/// Label-deciding draws of one request.
///
/// Sentiment, flaw selection and the mixed family are fixed once per request
/// by [`PatternGenerator::plan`]. Rejected attempts rebuild geometry from the
/// same blueprint, so bounds rejection never shifts the label mix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Blueprint {
    RandomBar,
    ForcedBar { kind: BarType, sentiment: Sentiment },
    ExeBar { sentiment: Sentiment },
    OtherBar,
    BaseForceStrike { sentiment: Sentiment, flawed: bool },
    ContinuationForceStrike { sentiment: Sentiment, flawed: bool },
    SwingPointForceStrike { sentiment: Sentiment, flawed: bool },
    Reversal1 {
        sentiment: Sentiment,
        flaw: Option<reversal::Reversal1Flaw>,
    },
    Continuation1 {
        sentiment: Sentiment,
        flaws: continuation::Continuation1Flaws,
    },
}

impl Blueprint {
    /// Draw fresh geometry for this blueprint
    pub fn build<R: RandomSource + ?Sized>(self, rng: &mut R) -> Generated {
        match self {
            Blueprint::RandomBar => Generated::Bar(single_bar::random_bar(rng)),
            Blueprint::ForcedBar { kind, sentiment } => {
                Generated::Bar(single_bar::forced(rng, kind, sentiment))
            }
            Blueprint::ExeBar { sentiment } => Generated::Bar(single_bar::exe(rng, sentiment)),
            Blueprint::OtherBar => Generated::Bar(single_bar::other(rng)),
            Blueprint::BaseForceStrike { sentiment, flawed }
            | Blueprint::ContinuationForceStrike { sentiment, flawed } => Generated::Pattern(
                force_strike::base_force_strike_with(rng, sentiment, flawed),
            ),
            Blueprint::SwingPointForceStrike { sentiment, flawed } => Generated::Pattern(
                force_strike::swing_point_force_strike_with(rng, sentiment, flawed),
            ),
            Blueprint::Reversal1 { sentiment, flaw } => {
                Generated::Pattern(reversal::reversal1_with(rng, sentiment, flaw))
            }
            Blueprint::Continuation1 { sentiment, flaws } => {
                Generated::Pattern(continuation::continuation1_with(rng, sentiment, flaws))
            }
        }
    }
}

/// Generated bar or pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Generated {
    Bar(Bar),
    Pattern(Pattern),
}

impl Generated {
    pub fn as_bar(&self) -> Option<&Bar> {
        match self {
            Generated::Bar(bar) => Some(bar),
            Generated::Pattern(_) => None,
        }
    }

    pub fn as_pattern(&self) -> Option<&Pattern> {
        match self {
            Generated::Pattern(pattern) => Some(pattern),
            Generated::Bar(_) => None,
        }
    }

    pub fn into_pattern(self) -> Option<Pattern> {
        match self {
            Generated::Pattern(pattern) => Some(pattern),
            Generated::Bar(_) => None,
        }
    }
}

impl Candidate for Generated {
    fn bars(&self) -> &[Bar] {
        match self {
            Generated::Bar(bar) => bar.bars(),
            Generated::Pattern(pattern) => pattern.bars(),
        }
    }
}

// ============================================================
// GENERATOR
// ============================================================

/// Stateless generator: configuration plus the acceptance gate
#[derive(Debug, Clone)]
pub struct PatternGenerator<V: Validator = BoundsValidator> {
    validator: V,
    config: GeneratorConfig,
}

impl Default for PatternGenerator<BoundsValidator> {
    fn default() -> Self {
        Self {
            validator: BoundsValidator::default(),
            config: GeneratorConfig::default(),
        }
    }
}

impl<V: Validator> PatternGenerator<V> {
    #[inline]
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    #[inline]
    pub fn validator(&self) -> &V {
        &self.validator
    }

    /// Run the rejection sampler over an arbitrary candidate factory
    pub fn sample<T: Candidate>(&self, make: impl FnMut() -> T) -> Sampled<T> {
        sample_until(self.config.max_attempts, &self.validator, make)
    }

    /// Serve a request through the rejection sampler
    pub fn generate<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        request: Request,
    ) -> Sampled<Generated> {
        let blueprint = self.plan(rng, request);
        self.sample(|| blueprint.build(rng))
    }

    /// Produce a single candidate without bounds checking
    pub fn generate_unchecked<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        request: Request,
    ) -> Generated {
        self.plan(rng, request).build(rng)
    }

    /// Fix sentiment, flaws and the mixed family for one request
    pub fn plan<R: RandomSource + ?Sized>(&self, rng: &mut R, request: Request) -> Blueprint {
        let flaws = &self.config.flaws;
        let blueprint = match request {
            Request::RandomBar => Blueprint::RandomBar,
            Request::ForcedBar { kind, sentiment } => Blueprint::ForcedBar { kind, sentiment },
            Request::SimpleBar { exe: true } => Blueprint::ExeBar {
                sentiment: rng.sentiment(),
            },
            Request::SimpleBar { exe: false } => Blueprint::OtherBar,
            Request::BaseForceStrike => Blueprint::BaseForceStrike {
                sentiment: rng.sentiment(),
                flawed: rng.chance(flaws.base_force_strike.get()),
            },
            Request::ContinuationForceStrike => Blueprint::ContinuationForceStrike {
                sentiment: rng.sentiment(),
                flawed: rng.chance(flaws.base_force_strike.get()),
            },
            Request::SwingPointForceStrike => Blueprint::SwingPointForceStrike {
                sentiment: rng.sentiment(),
                flawed: rng.chance(flaws.swing_point.get()),
            },
            Request::Reversal1 => Blueprint::Reversal1 {
                sentiment: rng.sentiment(),
                flaw: reversal::Reversal1Flaw::draw(rng, flaws.reversal1.get()),
            },
            Request::Continuation1 => Blueprint::Continuation1 {
                sentiment: rng.sentiment(),
                flaws: continuation::Continuation1Flaws::draw_instance(
                    rng,
                    flaws.continuation1.get(),
                    flaws.continuation1_condition.get(),
                ),
            },
            Request::ComprehensiveMix => {
                let family = Request::PATTERN_FAMILIES[rng.pick(Request::PATTERN_FAMILIES.len())];
                return self.plan(rng, family);
            }
        };
        log::trace!("{request:?} planned as {blueprint:?}");
        blueprint
    }

    pub fn random_bar<R: RandomSource + ?Sized>(&self, rng: &mut R) -> Sampled<Bar> {
        self.sample(|| single_bar::random_bar(rng))
    }

    pub fn forced_bar<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        kind: BarType,
        sentiment: Sentiment,
    ) -> Sampled<Bar> {
        self.sample(|| single_bar::forced(rng, kind, sentiment))
    }

    /// Sample a pattern request; single-bar requests yield `None`
    pub fn pattern<R: RandomSource + ?Sized>(
        &self,
        rng: &mut R,
        request: Request,
    ) -> Option<Sampled<Pattern>> {
        if !request.is_pattern() {
            return None;
        }
        let blueprint = self.plan(rng, request);
        Some(self.sample(|| match blueprint.build(rng) {
            Generated::Pattern(pattern) => pattern,
            Generated::Bar(bar) => Pattern::new(vec![bar], PatternType::Other),
        }))
    }
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating PatternGenerator instances
#[derive(Debug, Clone)]
pub struct GeneratorBuilder<V: Validator = BoundsValidator> {
    validator: V,
    config: GeneratorConfig,
}

impl Default for GeneratorBuilder<BoundsValidator> {
    fn default() -> Self {
        Self::new()
    }
}

impl GeneratorBuilder<BoundsValidator> {
    pub fn new() -> Self {
        Self {
            validator: BoundsValidator::default(),
            config: GeneratorConfig::default(),
        }
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: GeneratorConfig) -> Self {
        self.validator = BoundsValidator::new(config.bounds);
        self.config = config;
        self
    }

    /// Set the visible price range checked by the bounds validator
    pub fn bounds(mut self, min: f64, max: f64) -> Self {
        self.config.bounds = PriceBounds { min, max };
        self.validator = BoundsValidator::new(self.config.bounds);
        self
    }
}

impl<V: Validator> GeneratorBuilder<V> {
    /// Change the acceptance gate
    pub fn validator<V2: Validator>(self, validator: V2) -> GeneratorBuilder<V2> {
        GeneratorBuilder {
            validator,
            config: self.config,
        }
    }

    /// Set the retry cap
    pub fn max_attempts(mut self, max_attempts: usize) -> Self {
        self.config.max_attempts = max_attempts;
        self
    }

    /// Set the flaw probabilities
    pub fn flaw_chances(mut self, flaws: config::FlawChances) -> Self {
        self.config.flaws = flaws;
        self
    }

    /// Build the generator
    pub fn build(self) -> Result<PatternGenerator<V>> {
        self.config.validate()?;
        Ok(PatternGenerator {
            validator: self.validator,
            config: self.config,
        })
    }
}

// ============================================================
// TESTS
// ============================================================
