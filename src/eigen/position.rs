//! Position Weighting: earlier spread positions carry more interpretive weight.

pub const MIN_POSITION_WEIGHT: f64 = 0.5;
pub const MAX_POSITION_WEIGHT: f64 = 2.0;

const POSITION_WEIGHTS: [f64; 10] = [2.0, 1.8, 1.6, 1.5, 1.4, 1.3, 1.2, 1.1, 1.0, 0.9];

/// Significance multiplier for a zero-based position index, in `[0.5, 2.0]`.
pub fn position_weight(index: usize) -> f64 {
    match POSITION_WEIGHTS.get(index) {
        Some(&w) => w,
        None => fallback_position_weight(index).clamp(MIN_POSITION_WEIGHT, MAX_POSITION_WEIGHT),
    }
}

/// Linear decay used past the table, before clamping.
pub fn fallback_position_weight(index: usize) -> f64 {
    1.0 - 0.05 * index as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_values() {
        assert_eq!(position_weight(0), 2.0);
        assert_eq!(position_weight(3), 1.5);
        assert_eq!(position_weight(9), 0.9);
    }

    #[test]
    fn non_increasing_and_bounded() {
        for i in 0..40 {
            let (a, b) = (position_weight(i), position_weight(i + 1));
            assert!(a >= b, "weight({i})={a} < weight({})={b}", i + 1);
            assert!((MIN_POSITION_WEIGHT..=MAX_POSITION_WEIGHT).contains(&a));
        }
    }

    #[test]
    fn fallback_is_clamped_to_floor() {
        assert!((fallback_position_weight(10) - 0.5).abs() < 1e-12);
        assert_eq!(position_weight(10), 0.5);
        assert!(fallback_position_weight(14) < 0.5);
        assert_eq!(position_weight(14), MIN_POSITION_WEIGHT);
    }
}
