//! Number rendering

use num_format::Locale;

use crate::error::FormatError;
use crate::locale::{group_digits, resolve_locale};

/// Render `value` with exactly `decimals` fractional digits, no grouping
///
/// Ties round half away from zero. A result that rounds to zero never
/// carries a minus sign. Non-finite values render as `NaN`, `inf` or `-inf`.
pub fn fixed_decimal(value: f64, decimals: u32) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let rendered = format!("{:.*}", decimals as usize, round_half_away(value, decimals));
    match rendered.strip_prefix('-') {
        Some(magnitude) if magnitude.bytes().all(|b| b == b'0' || b == b'.') => {
            magnitude.to_string()
        }
        _ => rendered,
    }
}

/// Largest magnitude at which an f64 can still hold a fractional half
const MAX_TIE_MAGNITUDE: f64 = 4_503_599_627_370_496.0; // 2^52

/// `format!` rounds exact ties to even, so settle them first
fn round_half_away(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals.min(i32::MAX as u32) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() || scaled.abs() >= MAX_TIE_MAGNITUDE {
        return value;
    }
    let rounded = scaled.round() / factor;
    if rounded.is_finite() {
        rounded
    } else {
        value
    }
}

/// Render `value` with locale thousands separators and exactly `decimals`
/// fractional digits
pub fn grouped(value: f64, decimals: u32, locale: &str) -> Result<String, FormatError> {
    let locale = resolve_locale(locale)?;
    Ok(grouped_with(value, decimals, &locale))
}

/// [`grouped`] with already resolved locale data
pub fn grouped_with(value: f64, decimals: u32, locale: &Locale) -> String {
    let fixed = fixed_decimal(value, decimals);
    if !value.is_finite() {
        return fixed;
    }

    let (negative, magnitude) = match fixed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, fixed.as_str()),
    };
    let (integer, fraction) = match magnitude.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (magnitude, None),
    };

    let mut out = String::with_capacity(fixed.len() + fixed.len() / 3 + 4);
    if negative {
        out.push_str(locale.minus_sign());
    }
    out.push_str(&group_digits(integer, locale.grouping(), locale.separator()));
    if let Some(fraction) = fraction {
        out.push_str(locale.decimal());
        out.push_str(fraction);
    }
    out
}

/// A reusable display style for animated values
#[derive(Clone, Debug, PartialEq)]
pub enum NumberFormat {
    /// Plain digits with fixed precision
    Fixed { decimals: u32 },
    /// Locale-grouped digits with fixed precision
    Grouped { decimals: u32, locale: Locale },
}

impl NumberFormat {
    pub fn fixed(decimals: u32) -> Self {
        NumberFormat::Fixed { decimals }
    }

    /// Grouped style for a locale tag such as `en-US`
    pub fn grouped(decimals: u32, locale: &str) -> Result<Self, FormatError> {
        Ok(NumberFormat::Grouped {
            decimals,
            locale: resolve_locale(locale)?,
        })
    }

    pub fn decimals(&self) -> u32 {
        match self {
            NumberFormat::Fixed { decimals } | NumberFormat::Grouped { decimals, .. } => *decimals,
        }
    }

    pub fn render(&self, value: f64) -> String {
        match self {
            NumberFormat::Fixed { decimals } => fixed_decimal(value, *decimals),
            NumberFormat::Grouped { decimals, locale } => grouped_with(value, *decimals, locale),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_decimal() {
        assert_eq!(fixed_decimal(3.14159, 2), "3.14");
        assert_eq!(fixed_decimal(2.0, 3), "2.000");
        assert_eq!(fixed_decimal(1234567.891, 0), "1234568");
        assert_eq!(fixed_decimal(-12.5, 1), "-12.5");
    }

    #[test]
    fn test_fixed_decimal_drops_negative_zero() {
        assert_eq!(fixed_decimal(-0.0, 0), "0");
        assert_eq!(fixed_decimal(-0.004, 2), "0.00");
        assert_eq!(fixed_decimal(-0.006, 2), "-0.01");
    }

    #[test]
    fn test_fixed_decimal_rounds_half_away_from_zero() {
        assert_eq!(fixed_decimal(2.5, 0), "3");
        assert_eq!(fixed_decimal(0.5, 0), "1");
        assert_eq!(fixed_decimal(96.5, 0), "97");
        assert_eq!(fixed_decimal(0.125, 2), "0.13");
        assert_eq!(fixed_decimal(-2.5, 0), "-3");
        assert_eq!(fixed_decimal(-0.5, 0), "-1");
    }

    #[test]
    fn test_grouped_rounds_half_away_from_zero() {
        assert_eq!(grouped(1234.5, 0, "en").unwrap(), "1,235");
        assert_eq!(grouped(-1234.5, 0, "en").unwrap(), "-1,235");
        assert_eq!(NumberFormat::fixed(0).render(2.5), "3");
    }

    #[test]
    fn test_fixed_decimal_large_precision() {
        assert_eq!(fixed_decimal(1e300, 20).len(), 322);
        assert_eq!(fixed_decimal(0.1, 20), format!("{:.20}", 0.1));
    }

    #[test]
    fn test_fixed_decimal_non_finite() {
        assert_eq!(fixed_decimal(f64::NAN, 2), "NaN");
        assert_eq!(fixed_decimal(f64::INFINITY, 2), "inf");
        assert_eq!(fixed_decimal(f64::NEG_INFINITY, 0), "-inf");
    }

    #[test]
    fn test_grouped_en_us() {
        assert_eq!(grouped(1234567.891, 2, "en-US").unwrap(), "1,234,567.89");
        assert_eq!(grouped(999.0, 0, "en-US").unwrap(), "999");
        assert_eq!(grouped(1000.0, 0, "en").unwrap(), "1,000");
        assert_eq!(grouped(-9876543.2, 1, "en").unwrap(), "-9,876,543.2");
        assert_eq!(grouped(0.5, 3, "en").unwrap(), "0.500");
    }

    #[test]
    fn test_grouped_rounding_carries_into_groups() {
        assert_eq!(grouped(999999.999, 2, "en").unwrap(), "1,000,000.00");
    }

    #[test]
    fn test_grouped_german() {
        assert_eq!(grouped(1234567.891, 2, "de").unwrap(), "1.234.567,89");
    }

    #[test]
    fn test_grouped_unknown_locale() {
        assert_eq!(
            grouped(1.0, 0, "zz"),
            Err(FormatError::UnknownLocale("zz".to_string()))
        );
    }

    #[test]
    fn test_number_format_render() {
        let fixed = NumberFormat::fixed(1);
        assert_eq!(fixed.render(96.88), "96.9");
        assert_eq!(fixed.decimals(), 1);

        let grouped = NumberFormat::grouped(0, "en-US").unwrap();
        assert_eq!(grouped.render(1234.4), "1,234");
        assert_eq!(grouped.decimals(), 0);

        assert!(NumberFormat::grouped(0, "not-a-locale").is_err());
    }
}
