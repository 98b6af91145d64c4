//! Formatting error types

use thiserror::Error;

/// Errors that can occur when configuring a number format
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// No locale data matches the tag, even after dropping subtags
    #[error("Unknown locale: '{0}'")]
    UnknownLocale(String),
}
