//! Locale lookup and digit grouping
//!
//! Separator, decimal mark, minus sign and grouping style come from the CLDR
//! tables bundled with `num-format`.

use num_format::{Grouping, Locale};

use crate::error::FormatError;

/// Resolve a BCP-47 style tag to locale data
///
/// Accepts `-` or `_` separators. Unknown regional or script subtags are
/// dropped one at a time from the right, so `en-US` falls back to `en`.
pub fn resolve_locale(tag: &str) -> Result<Locale, FormatError> {
    let normalized = tag.trim().replace('_', "-");
    let mut candidate = normalized.as_str();

    while !candidate.is_empty() {
        if let Ok(locale) = Locale::from_name(candidate) {
            return Ok(locale);
        }
        match candidate.rfind('-') {
            Some(idx) => candidate = &candidate[..idx],
            None => break,
        }
    }

    Err(FormatError::UnknownLocale(tag.to_string()))
}

/// Insert `separator` into a run of ASCII digits
pub(crate) fn group_digits(digits: &str, grouping: Grouping, separator: &str) -> String {
    let (first, rest) = match grouping {
        Grouping::Posix => return digits.to_string(),
        Grouping::Indian => (3, 2),
        _ => (3, 3),
    };

    let mut groups = Vec::new();
    let mut end = digits.len();
    let mut size = first;
    while end > size {
        groups.push(&digits[end - size..end]);
        end -= size;
        size = rest;
    }
    groups.push(&digits[..end]);
    groups.reverse();
    groups.join(separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_falls_back_to_language() {
        assert_eq!(resolve_locale("en-US").unwrap().separator(), ",");
        assert_eq!(resolve_locale("en_US").unwrap().decimal(), ".");
        assert_eq!(resolve_locale("de-DE").unwrap().separator(), ".");
        assert_eq!(resolve_locale("de").unwrap().decimal(), ",");
    }

    #[test]
    fn test_resolve_unknown() {
        assert_eq!(
            resolve_locale("xx-YY"),
            Err(FormatError::UnknownLocale("xx-YY".to_string()))
        );
        assert!(resolve_locale("").is_err());
    }

    #[test]
    fn test_standard_grouping() {
        assert_eq!(group_digits("0", Grouping::Standard, ","), "0");
        assert_eq!(group_digits("999", Grouping::Standard, ","), "999");
        assert_eq!(group_digits("1000", Grouping::Standard, ","), "1,000");
        assert_eq!(group_digits("1234567", Grouping::Standard, ","), "1,234,567");
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(group_digits("1234567", Grouping::Indian, ","), "12,34,567");
        assert_eq!(group_digits("100000", Grouping::Indian, ","), "1,00,000");
    }

    #[test]
    fn test_posix_grouping() {
        assert_eq!(group_digits("1234567", Grouping::Posix, ","), "1234567");
    }

    #[test]
    fn test_multibyte_separator() {
        assert_eq!(group_digits("1234567", Grouping::Standard, "\u{a0}"), "1\u{a0}234\u{a0}567");
    }
}
