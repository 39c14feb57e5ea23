//! Generator configuration
//!
//! Visible price bounds, the retry cap of the rejection sampler and the flaw
//! probabilities of each pattern family. Every field has a default matching the
//! trainer's stock behaviour, so a config file only needs the fields it changes.
//!
//! # Example
//!
//! ```rust
//! use pagen::config::GeneratorConfig;
//!
//! let config: GeneratorConfig = serde_json::from_str(r#"{ "max_attempts": 10 }"#).unwrap();
//! assert_eq!(config.max_attempts, 10);
//! assert_eq!(config.bounds.max, 100.0);
//! config.validate().unwrap();
//! ```

use serde::{Deserialize, Serialize};

use crate::{PatternError, Ratio, Result};

/// Default retry cap of the rejection sampler.
pub const DEFAULT_MAX_ATTEMPTS: usize = 30;

// ============================================================
// PRICE BOUNDS
// ============================================================

/// Closed visible price range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceBounds {
    pub min: f64,
    pub max: f64,
}

impl Default for PriceBounds {
    fn default() -> Self {
        Self { min: -100.0, max: 100.0 }
    }
}

impl PriceBounds {
    #[inline]
    pub fn contains(&self, low: f64, high: f64) -> bool {
        low >= self.min && high <= self.max
    }

    pub fn validate(&self) -> Result<()> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(PatternError::InvalidValue("price bounds must be finite"));
        }
        if self.min >= self.max {
            return Err(PatternError::InvalidConfig(format!(
                "price bounds inverted: min {} >= max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

// ============================================================
// FLAW CHANCES
// ============================================================

/// Probability of generating a negative ("flawed") example, per family.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlawChances {
    /// Base and continuation force strikes: failed-reversal bar instead of a cluster.
    pub base_force_strike: Ratio,
    /// Swing-point force strikes: cluster ends on a non-Exe bar.
    pub swing_point: Ratio,
    /// Reversal1: one of three flaw modes.
    pub reversal1: Ratio,
    /// Continuation1: the instance is eligible for flaw conditions.
    pub continuation1: Ratio,
    /// Continuation1: probability of each independent flaw condition once eligible.
    pub continuation1_condition: Ratio,
}

impl Default for FlawChances {
    fn default() -> Self {
        Self {
            base_force_strike: Ratio::new_const(0.4),
            swing_point: Ratio::new_const(0.5),
            reversal1: Ratio::new_const(0.5),
            continuation1: Ratio::new_const(0.5),
            continuation1_condition: Ratio::new_const(0.5),
        }
    }
}

// ============================================================
// GENERATOR CONFIG
// ============================================================

/// Complete generator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub bounds: PriceBounds,
    /// Candidates generated before the sampler falls back to the last one.
    pub max_attempts: usize,
    pub flaws: FlawChances,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            bounds: PriceBounds::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            flaws: FlawChances::default(),
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        self.bounds.validate()?;
        if self.max_attempts == 0 {
            return Err(PatternError::InvalidValue("max_attempts must be > 0"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.bounds, PriceBounds { min: -100.0, max: 100.0 });
        assert_eq!(config.max_attempts, 30);
        assert_eq!(config.flaws.base_force_strike.get(), 0.4);
        assert_eq!(config.flaws.swing_point.get(), 0.5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bounds_contains() {
        let bounds = PriceBounds::default();
        assert!(bounds.contains(-100.0, 100.0));
        assert!(!bounds.contains(-100.1, 0.0));
        assert!(!bounds.contains(0.0, 100.1));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let config = GeneratorConfig { max_attempts: 0, ..Default::default() };
        assert!(matches!(config.validate(), Err(PatternError::InvalidValue(_))));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let config = GeneratorConfig {
            bounds: PriceBounds { min: 10.0, max: -10.0 },
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PatternError::InvalidConfig(_))));

        let config = GeneratorConfig {
            bounds: PriceBounds { min: f64::NEG_INFINITY, max: 0.0 },
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json() {
        let config: GeneratorConfig =
            serde_json::from_str(r#"{ "flaws": { "swing_point": 0.25 } }"#).unwrap();
        assert_eq!(config.flaws.swing_point.get(), 0.25);
        assert_eq!(config.flaws.base_force_strike.get(), 0.4);
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_json_rejects_bad_ratio() {
        let parsed: std::result::Result<GeneratorConfig, _> =
            serde_json::from_str(r#"{ "flaws": { "reversal1": 1.5 } }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = GeneratorConfig { max_attempts: 5, ..Default::default() };
        let json = serde_json::to_string(&config).unwrap();
        let back: GeneratorConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
