//! Tally number formatting
//!
//! Stateless rendering of animated values into display strings.
//!
//! - [`fixed_decimal`]: exact fractional digits, no grouping
//! - [`grouped`]: locale thousands separators with exact fractional digits
//! - [`estimate_read_minutes`]: informational read-time estimate
//! - [`NumberFormat`]: a reusable display style
//!
//! # Example
//!
//! ```rust
//! use tally_format::{fixed_decimal, grouped};
//!
//! assert_eq!(fixed_decimal(3.14159, 2), "3.14");
//! assert_eq!(grouped(1234567.891, 2, "en-US").unwrap(), "1,234,567.89");
//! ```

pub mod error;
pub mod locale;
pub mod number;
pub mod reading;

pub use error::FormatError;
pub use locale::resolve_locale;
pub use number::{fixed_decimal, grouped, grouped_with, NumberFormat};
pub use reading::{estimate_read_minutes, UNITS_PER_MINUTE};
