//! Card Energy Model: card + orientation + keyword list → base energy scalar.
//!
//! Two orientation treatments coexist and are kept apart:
//! - [`card_energy`] (manual readings): reversed cards are dampened by `0.75`.
//! - [`card_energy_signed`] (AI-assisted readings): a signed orientation term is
//!   added before clamping instead of multiplying.
//!
//! Both clamp to `[0, 1]`.

use crate::model::Card;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const MAJOR_BASE_WEIGHT: f64 = 1.2;
pub const MINOR_BASE_WEIGHT: f64 = 1.0;

/// Keyword energy when no vocabulary term is hit.
pub const NEUTRAL_KEYWORD_ENERGY: f64 = 0.8;

pub const REVERSED_DAMPING: f64 = 0.75;

pub const SIGNED_UPRIGHT_TERM: f64 = 0.1;
pub const SIGNED_REVERSED_TERM: f64 = -0.2;

pub const POSITIVE_TERMS: [&str; 18] = [
    "success",
    "growth",
    "abundance",
    "joy",
    "love",
    "harmony",
    "peace",
    "clarity",
    "wisdom",
    "strength",
    "power",
    "victory",
    "achievement",
    "prosperity",
    "happiness",
    "fulfillment",
    "balance",
    "hope",
];

pub const CHALLENGING_TERMS: [&str; 18] = [
    "conflict",
    "loss",
    "sorrow",
    "confusion",
    "fear",
    "anxiety",
    "struggle",
    "defeat",
    "betrayal",
    "deception",
    "stagnation",
    "restriction",
    "bondage",
    "chaos",
    "destruction",
    "pain",
    "suffering",
    "darkness",
];

/// Bespoke Major Arcana weights keyed by numerology label "0".."21".
static MAJOR_WEIGHTS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("0", 1.3),  // The Fool
        ("1", 1.5),  // The Magician
        ("2", 1.5),  // The High Priestess
        ("3", 1.4),  // The Empress
        ("4", 1.4),  // The Emperor
        ("5", 1.3),  // The Hierophant
        ("6", 1.4),  // The Lovers
        ("7", 1.3),  // The Chariot
        ("8", 1.3),  // Strength
        ("9", 1.3),  // The Hermit
        ("10", 1.5), // Wheel of Fortune
        ("11", 1.4), // Justice
        ("12", 1.2), // The Hanged Man
        ("13", 1.5), // Death
        ("14", 1.2), // Temperance
        ("15", 1.4), // The Devil
        ("16", 1.6), // The Tower
        ("17", 1.3), // The Star
        ("18", 1.3), // The Moon
        ("19", 1.5), // The Sun
        ("20", 1.4), // Judgement
        ("21", 1.6), // The World
    ])
});

/// Arcana-based weight. Major cards with a known label use the bespoke table.
pub fn card_type_weight(card: &Card) -> f64 {
    if !card.is_major() {
        return MINOR_BASE_WEIGHT;
    }
    card.numerology
        .as_deref()
        .and_then(|label| MAJOR_WEIGHTS.get(label).copied())
        .unwrap_or(MAJOR_BASE_WEIGHT)
}

/// Sentiment of a keyword list against the two fixed vocabularies.
///
/// A keyword counts once per vocabulary when it contains any of its terms
/// (case-insensitive substring). `0.5 + (pos - neg) / (2 * total)`, or the
/// neutral constant when nothing matched.
pub fn keyword_energy(keywords: &[String]) -> f64 {
    let mut positive = 0usize;
    let mut challenging = 0usize;

    for kw in keywords {
        let kw = kw.to_lowercase();
        if POSITIVE_TERMS.iter().any(|t| kw.contains(t)) {
            positive += 1;
        }
        if CHALLENGING_TERMS.iter().any(|t| kw.contains(t)) {
            challenging += 1;
        }
    }

    let total = positive + challenging;
    if total == 0 {
        return NEUTRAL_KEYWORD_ENERGY;
    }
    0.5 + (positive as f64 - challenging as f64) / (2.0 * total as f64)
}

/// Manual-reading energy: `type_weight * keyword_energy * orientation`, clamped to `[0, 1]`.
pub fn card_energy(card: &Card, is_reversed: bool) -> f64 {
    let orientation = if is_reversed { REVERSED_DAMPING } else { 1.0 };
    let raw = card_type_weight(card) * keyword_energy(card.keywords_for(is_reversed)) * orientation;
    raw.clamp(0.0, 1.0)
}

/// AI-reading energy: `type_weight * keyword_energy + orientation_term`, clamped to `[0, 1]`.
pub fn card_energy_signed(card: &Card, is_reversed: bool) -> f64 {
    let term = if is_reversed {
        SIGNED_REVERSED_TERM
    } else {
        SIGNED_UPRIGHT_TERM
    };
    let raw = card_type_weight(card) * keyword_energy(card.keywords_for(is_reversed)) + term;
    raw.clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Arcana;

    fn kws(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn neutral_when_no_vocabulary_hits() {
        assert_eq!(keyword_energy(&kws(&["beginnings", "innocence"])), NEUTRAL_KEYWORD_ENERGY);
        assert_eq!(keyword_energy(&[]), NEUTRAL_KEYWORD_ENERGY);
    }

    #[test]
    fn mixed_keywords_balance_out() {
        // 1 positive, 2 challenging → 0.5 - 1/6
        let e = keyword_energy(&kws(&["Loss", "FEAR", "joy"]));
        assert!((e - (0.5 - 1.0 / 6.0)).abs() < 1e-12);
        let e = keyword_energy(&kws(&["success", "inner strength"]));
        assert!((e - 1.0).abs() < 1e-12);
    }

    #[test]
    fn major_table_overrides_generic_weight() {
        let tower = Card::new("t", "The Tower", Arcana::Major).numerology("16");
        let unknown = Card::new("u", "Unnumbered", Arcana::Major);
        let minor = Card::new("m", "Two of Cups", Arcana::Minor).numerology("16");
        assert_eq!(card_type_weight(&tower), 1.6);
        assert_eq!(card_type_weight(&unknown), MAJOR_BASE_WEIGHT);
        assert_eq!(card_type_weight(&minor), MINOR_BASE_WEIGHT);
    }

    #[test]
    fn reversed_is_dampened_not_inverted() {
        let c = Card::new("c", "Three of Cups", Arcana::Minor)
            .keywords(&["celebration"], &["excess"]);
        assert!((card_energy(&c, false) - 0.8).abs() < 1e-12);
        assert!((card_energy(&c, true) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn signed_variant_adds_orientation_term() {
        let c = Card::new("c", "Four of Swords", Arcana::Minor).keywords(&["rest"], &["burnout"]);
        assert!((card_energy_signed(&c, false) - 0.9).abs() < 1e-12);
        assert!((card_energy_signed(&c, true) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn energy_is_clamped() {
        let sun = Card::new("s", "The Sun", Arcana::Major)
            .numerology("19")
            .keywords(&["joy", "success"], &["sorrow", "darkness"]);
        assert_eq!(card_energy(&sun, false), 1.0);
        assert_eq!(card_energy_signed(&sun, false), 1.0);
        // reversed keyword energy is 0.0 → signed term pushes below zero, clamped
        assert_eq!(card_energy_signed(&sun, true), 0.0);
        assert_eq!(card_energy(&sun, true), 0.0);
    }
}
