//! Easing curves
//!
//! Both curves are ease-out: fast start, soft landing. They map elapsed
//! fraction `t ∈ [0, 1]` to progress fraction `[0, 1]` and are strictly
//! increasing on `(0, 1)`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AnimationError;

/// Curve family used by a transition
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Easing {
    /// `1 - 2^(-10t)`, pinned to exactly 1 at `t = 1`
    #[default]
    Expo,
    /// `1 - (1 - t)^3`
    Cubic,
}

impl Easing {
    /// All supported curves
    pub const ALL: [Easing; 2] = [Easing::Expo, Easing::Cubic];

    /// Apply the curve to `t`. Input outside `[0, 1]` is clamped.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            // The raw formula gives 0.9990234375 at t = 1
            Easing::Expo => {
                if t >= 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * t)
                }
            }
            Easing::Cubic => 1.0 - (1.0 - t).powi(3),
        }
    }

    /// Configuration key for this curve
    pub fn key(self) -> &'static str {
        match self {
            Easing::Expo => "expo",
            Easing::Cubic => "cubic",
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Easing {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .into_iter()
            .find(|easing| easing.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                AnimationError::config(
                    "easing",
                    format!("unknown easing '{}', expected one of: expo, cubic", s),
                )
            })
    }
}
