//! Read-time estimate

/// Units read per minute
pub const UNITS_PER_MINUTE: u64 = 200;

/// Whole minutes needed to read `total_units`, rounded up
pub fn estimate_read_minutes(total_units: u64) -> u64 {
    total_units.div_ceil(UNITS_PER_MINUTE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rounds_up_partial_minutes() {
        assert_eq!(estimate_read_minutes(0), 0);
        assert_eq!(estimate_read_minutes(1), 1);
        assert_eq!(estimate_read_minutes(200), 1);
        assert_eq!(estimate_read_minutes(201), 2);
        assert_eq!(estimate_read_minutes(10_000), 50);
    }

    #[test]
    fn test_no_overflow_at_max() {
        assert_eq!(estimate_read_minutes(u64::MAX), u64::MAX / 200 + 1);
    }
}
