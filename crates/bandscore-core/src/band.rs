//! Percentage to IELTS band conversion.

/// `(minimum percentage, band)` breakpoints, highest first.
pub const BAND_TABLE: &[(f64, f64)] = &[
    (90.0, 9.0),
    (85.0, 8.5),
    (80.0, 8.0),
    (75.0, 7.5),
    (70.0, 7.0),
    (65.0, 6.5),
    (60.0, 6.0),
    (55.0, 5.5),
    (50.0, 5.0),
    (40.0, 4.5),
    (30.0, 4.0),
    (20.0, 3.5),
    (10.0, 3.0),
];

/// Band awarded below the lowest breakpoint.
pub const MIN_BAND: f64 = 2.5;

/// Look up the band for a percentage of correct answers (0-100).
pub fn band_score(percentage: f64) -> f64 {
    BAND_TABLE
        .iter()
        .find(|(threshold, _)| percentage >= *threshold)
        .map(|(_, band)| *band)
        .unwrap_or(MIN_BAND)
}

/// Percentage of `correct` out of `total`, or `None` when nothing was graded.
pub fn percentage(correct: u32, total: u32) -> Option<f64> {
    (total > 0).then(|| correct as f64 / total as f64 * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_values() {
        assert_eq!(band_score(92.0), 9.0);
        assert_eq!(band_score(67.0), 6.5);
        assert_eq!(band_score(5.0), 2.5);
    }

    #[test]
    fn breakpoints_are_inclusive() {
        for &(threshold, band) in BAND_TABLE {
            assert_eq!(band_score(threshold), band, "at {threshold}%");
        }
        assert_eq!(band_score(89.99), 8.5);
        assert_eq!(band_score(49.9), 4.5);
        assert_eq!(band_score(9.99), 2.5);
    }

    #[test]
    fn extremes() {
        assert_eq!(band_score(100.0), 9.0);
        assert_eq!(band_score(0.0), 2.5);
        assert_eq!(band_score(-3.0), 2.5);
    }

    #[test]
    fn percentage_of_graded() {
        assert_eq!(percentage(30, 40), Some(75.0));
        assert_eq!(percentage(0, 0), None);
    }
}
