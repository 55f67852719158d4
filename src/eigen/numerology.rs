//! Numerology Table, keyed by the raw label string.
//!
//! Lookups are exact string matches: " 7", "07" or "7.0" are not "7" and fall back
//! to the neutral factor.

use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const NEUTRAL_NUMEROLOGY: f64 = 1.0;

static NUMEROLOGY_WEIGHTS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("0", 1.0),
        ("1", 1.3),
        ("2", 1.1),
        ("3", 1.2),
        ("4", 1.1),
        ("5", 1.2),
        ("6", 1.2),
        ("7", 1.4),
        ("8", 1.3),
        ("9", 1.4),
        ("10", 1.3),
        ("11", 1.6), // master number
        ("12", 1.1),
        ("13", 1.3),
        ("14", 1.2),
        ("15", 1.2),
        ("16", 1.4),
        ("17", 1.2),
        ("18", 1.2),
        ("19", 1.3),
        ("20", 1.2),
        ("21", 1.5),
        ("22", 1.6), // master number
    ])
});

/// Multiplier in `[1.0, 1.6]`; neutral for `None` or unknown labels.
pub fn numerology_factor(label: Option<&str>) -> f64 {
    label
        .and_then(|l| NUMEROLOGY_WEIGHTS.get(l).copied())
        .unwrap_or(NEUTRAL_NUMEROLOGY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn master_numbers_are_highest() {
        let max = (0..=22)
            .map(|i| numerology_factor(Some(&i.to_string())))
            .fold(f64::MIN, f64::max);
        assert_eq!(max, 1.6);
        assert_eq!(numerology_factor(Some("11")), 1.6);
        assert_eq!(numerology_factor(Some("22")), 1.6);
    }

    #[test]
    fn exact_string_match_only() {
        assert_eq!(numerology_factor(Some("7")), 1.4);
        assert_eq!(numerology_factor(Some("07")), NEUTRAL_NUMEROLOGY);
        assert_eq!(numerology_factor(Some(" 7")), NEUTRAL_NUMEROLOGY);
        assert_eq!(numerology_factor(Some("23")), NEUTRAL_NUMEROLOGY);
        assert_eq!(numerology_factor(None), NEUTRAL_NUMEROLOGY);
    }

    #[test]
    fn all_labels_in_range() {
        for i in 0..=22 {
            let f = numerology_factor(Some(&i.to_string()));
            assert!((1.0..=1.6).contains(&f));
        }
    }
}
