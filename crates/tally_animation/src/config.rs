//! Transition configuration

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::error::AnimationError;

/// Default motion length in milliseconds
pub const DEFAULT_DURATION_MS: f64 = 800.0;

/// Extra fractional digits kept on intermediate frames
pub const DEFAULT_GUARD_DIGITS: u32 = 2;

/// Largest display precision accepted for `decimals`
pub const MAX_DECIMALS: u32 = 15;

/// Upper bound on `decimals + guard_digits` (f64 carries ~17 significant digits)
const MAX_ROUNDING_DIGITS: u32 = 17;

/// Configuration for one motion
///
/// Defaults: 800ms, 0 decimals, expo easing, no delay, 2 guard digits.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionConfig {
    /// Total motion length in milliseconds
    pub duration_ms: f64,
    /// Display precision of the value being animated
    pub decimals: u32,
    /// Curve family
    pub easing: Easing,
    /// Wait before the motion starts, in milliseconds
    pub delay_ms: f64,
    /// Fractional digits kept beyond `decimals` on intermediate frames
    pub guard_digits: u32,
}

impl TransitionConfig {
    /// Create a configuration with the given duration and defaults elsewhere
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            ..Self::default()
        }
    }

    pub fn with_duration(mut self, duration_ms: f64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn with_decimals(mut self, decimals: u32) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_delay(mut self, delay_ms: f64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    pub fn with_guard_digits(mut self, guard_digits: u32) -> Self {
        self.guard_digits = guard_digits;
        self
    }

    /// Reject out-of-range settings instead of clamping them
    pub fn validate(&self) -> Result<(), AnimationError> {
        if !self.duration_ms.is_finite() || self.duration_ms < 0.0 {
            return Err(AnimationError::config(
                "duration_ms",
                format!("must be a finite, non-negative number, got {}", self.duration_ms),
            ));
        }
        if !self.delay_ms.is_finite() || self.delay_ms < 0.0 {
            return Err(AnimationError::config(
                "delay_ms",
                format!("must be a finite, non-negative number, got {}", self.delay_ms),
            ));
        }
        if self.decimals > MAX_DECIMALS {
            return Err(AnimationError::config(
                "decimals",
                format!("must be at most {}, got {}", MAX_DECIMALS, self.decimals),
            ));
        }
        if self.rounding_digits() > MAX_ROUNDING_DIGITS {
            return Err(AnimationError::config(
                "guard_digits",
                format!(
                    "decimals + guard_digits must be at most {}, got {}",
                    MAX_ROUNDING_DIGITS,
                    self.rounding_digits()
                ),
            ));
        }
        Ok(())
    }

    /// Fractional digits intermediate frames are rounded to
    pub fn rounding_digits(&self) -> u32 {
        self.decimals.saturating_add(self.guard_digits)
    }
}

impl Default for TransitionConfig {
    fn default() -> Self {
        Self {
            duration_ms: DEFAULT_DURATION_MS,
            decimals: 0,
            easing: Easing::Expo,
            delay_ms: 0.0,
            guard_digits: DEFAULT_GUARD_DIGITS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: AnimationError) -> &'static str {
        match err {
            AnimationError::InvalidConfiguration { field, .. } => field,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_defaults() {
        let config = TransitionConfig::default();
        assert_eq!(config.duration_ms, 800.0);
        assert_eq!(config.decimals, 0);
        assert_eq!(config.easing, Easing::Expo);
        assert_eq!(config.delay_ms, 0.0);
        assert_eq!(config.rounding_digits(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_negative_duration_and_delay() {
        let err = TransitionConfig::new(-1.0).validate().unwrap_err();
        assert_eq!(field_of(err), "duration_ms");

        let err = TransitionConfig::default()
            .with_delay(-10.0)
            .validate()
            .unwrap_err();
        assert_eq!(field_of(err), "delay_ms");
    }

    #[test]
    fn test_rejects_non_finite_duration() {
        let err = TransitionConfig::new(f64::NAN).validate().unwrap_err();
        assert_eq!(field_of(err), "duration_ms");
        let err = TransitionConfig::new(f64::INFINITY).validate().unwrap_err();
        assert_eq!(field_of(err), "duration_ms");
    }

    #[test]
    fn test_rejects_excess_precision() {
        let err = TransitionConfig::default()
            .with_decimals(16)
            .validate()
            .unwrap_err();
        assert_eq!(field_of(err), "decimals");

        let err = TransitionConfig::default()
            .with_decimals(15)
            .with_guard_digits(3)
            .validate()
            .unwrap_err();
        assert_eq!(field_of(err), "guard_digits");
    }

    #[test]
    fn test_zero_duration_is_valid() {
        assert!(TransitionConfig::new(0.0).validate().is_ok());
    }

    #[test]
    fn test_deserialize_partial_table() {
        let config: TransitionConfig =
            toml::from_str("duration_ms = 1200.0\neasing = \"cubic\"").unwrap();
        assert_eq!(config.duration_ms, 1200.0);
        assert_eq!(config.easing, Easing::Cubic);
        assert_eq!(config.decimals, 0);
        assert_eq!(config.guard_digits, 2);
    }
}
