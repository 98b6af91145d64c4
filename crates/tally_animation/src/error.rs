//! Animation error types

use thiserror::Error;

/// Errors raised when a transition is misconfigured or handed a bad value
///
/// Both variants are programmer errors: the call is rejected and the
/// transition state is left untouched.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A configuration field is out of range or unrecognized
    #[error("Invalid configuration for `{field}`: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    /// Target or initial value is NaN or infinite
    #[error("Invalid target value {0}: must be finite")]
    InvalidTarget(f64),
}

impl AnimationError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            field,
            reason: reason.into(),
        }
    }
}
