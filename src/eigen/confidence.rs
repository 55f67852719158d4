//! Confidence Adjustment for AI-assisted readings.
//!
//! The detector's confidence is discretized into four bands; high-confidence
//! detections of several cards earn an additional quality bonus.

pub const HIGH_CONFIDENCE: f32 = 0.85;
pub const MEDIUM_CONFIDENCE: f32 = 0.65;
pub const LOW_CONFIDENCE: f32 = 0.45;

/// `1.0 / 0.85 / 0.7 / 0.5` for high / medium / low / anything else (including NaN).
pub fn confidence_factor(ai_confidence: f32) -> f64 {
    if ai_confidence >= HIGH_CONFIDENCE {
        1.0
    } else if ai_confidence >= MEDIUM_CONFIDENCE {
        0.85
    } else if ai_confidence >= LOW_CONFIDENCE {
        0.7
    } else {
        0.5
    }
}

pub fn detection_quality_bonus(ai_confidence: f32, card_count: usize) -> f64 {
    if ai_confidence >= HIGH_CONFIDENCE && card_count >= 3 {
        0.1 * (card_count - 2).min(5) as f64
    } else if ai_confidence >= MEDIUM_CONFIDENCE && card_count >= 5 {
        0.05 * (card_count - 4).min(3) as f64
    } else {
        0.0
    }
}

/// Post-normalization multiplier by number of resolved cards.
pub fn card_count_multiplier(card_count: usize) -> f64 {
    match card_count {
        0 | 1 => 0.7,
        2 => 0.8,
        3 => 1.0,
        4..=7 => 1.1,
        8..=10 => 1.2,
        _ => 1.3,
    }
}
