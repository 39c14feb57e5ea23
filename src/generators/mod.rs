//! Bar and pattern generators
//!
//! Every generator is a pure function of a [`RandomSource`](crate::random::RandomSource)
//! and returns geometry that already matches its label. Bounds are enforced one
//! level up, by the rejection sampler in [`PatternGenerator`](crate::PatternGenerator).
//!
//! # Families
//!
//! - **Single-bar**: Pin, Mark, Ice Cream (the Exe types) and Other
//! - **Cluster**: approach-then-reversal run shared by the multi-bar patterns
//! - **Force Strike**: Base, Continuation, Swing point
//! - **Reversal 1**: swing, retracement, flush and reversal through the swing
//! - **Continuation 1**: trend leg, pullback, lower-high/higher-low and breakout,
//!   with SMA20/SMA50 warmed up on 50 precursor bars

pub mod helpers;

pub mod cluster;
pub mod continuation;
pub mod force_strike;
pub mod reversal;
pub mod single_bar;

// Re-export generator entry points
pub use cluster::*;
pub use continuation::*;
pub use force_strike::*;
pub use reversal::*;
pub use single_bar::*;
