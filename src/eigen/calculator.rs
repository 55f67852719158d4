//! Eigenvalue composition for manual and AI-assisted readings.
//!
//! Manual: Σ(energy × position × numerology × elemental × astrology × type) plus the
//! cluster synergy bonus, normalized by the per-card theoretical maximum.
//!
//! AI-assisted: same factor chain with the signed card energy and the confidence
//! factor in place of the type weight. The detection-quality bonus joins the total
//! before normalization and the card-count multiplier is applied after it.

use serde::Serialize;

use super::astrology::{astrology_factor, MAX_ASTROLOGY};
use super::confidence::{card_count_multiplier, confidence_factor, detection_quality_bonus};
use super::elements::elemental_factor;
use super::energy::{card_energy, card_energy_signed, card_type_weight};
use super::numerology::numerology_factor;
use super::position::{position_weight, MAX_POSITION_WEIGHT};
use super::synergy::synergy_bonus;
use super::{clamp_unit, resolve_placements};
use crate::model::{Card, CardPlacement, SpreadPosition};

const MAX_NUMEROLOGY: f64 = 1.6;
const MAX_ELEMENTAL: f64 = 1.3;
const MAX_TYPE_WEIGHT: f64 = 1.6;

/// Theoretical maximum contribution of one manual placement.
pub const MAX_MANUAL_CONTRIBUTION: f64 =
    1.0 * MAX_POSITION_WEIGHT * MAX_NUMEROLOGY * MAX_ELEMENTAL * MAX_ASTROLOGY * MAX_TYPE_WEIGHT;

/// Theoretical maximum contribution of one AI-assisted placement.
pub const MAX_AI_CONTRIBUTION: f64 =
    1.0 * MAX_POSITION_WEIGHT * MAX_NUMEROLOGY * MAX_ELEMENTAL * MAX_ASTROLOGY * 1.0;

/// Factor-by-factor view of one manual placement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacementFactors {
    pub card_id: String,
    pub position_id: String,
    pub is_reversed: bool,
    pub card_energy: f64,
    pub position_weight: f64,
    pub numerology: f64,
    pub elemental: f64,
    pub astrology: f64,
    pub card_type_weight: f64,
    pub energy: f64,
}

/// Explainable manual eigenvalue. `eigenvalue` equals [`calculate_eigenvalue`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub placements: Vec<PlacementFactors>,
    pub skipped: usize,
    pub total_energy: f64,
    pub synergy_bonus: f64,
    pub max_possible_energy: f64,
    pub eigenvalue: f64,
}

/// Manual reading eigenvalue in `[0, 1]`.
pub fn calculate_eigenvalue(
    placements: &[CardPlacement],
    cards: &[Card],
    positions: &[SpreadPosition],
) -> f64 {
    explain_manual(placements, cards, positions).eigenvalue
}

pub fn explain_manual(
    placements: &[CardPlacement],
    cards: &[Card],
    positions: &[SpreadPosition],
) -> ScoreBreakdown {
    let resolved = resolve_placements(placements, cards, positions);
    let drawn: Vec<CardPlacement> = resolved.iter().map(|r| r.placement.clone()).collect();

    let mut factors = Vec::with_capacity(resolved.len());
    let mut total_energy = 0.0;
    let mut max_possible_energy = 0.0;

    for r in &resolved {
        let card_energy = card_energy(r.card, r.placement.is_reversed);
        let position_weight = position_weight(r.position.position_index);
        let numerology = numerology_factor(r.card.numerology.as_deref());
        let elemental = elemental_factor(r.card, r.position, cards, &drawn);
        let astrology = astrology_factor(r.card.astrology.as_deref());
        let card_type_weight = card_type_weight(r.card);

        let energy =
            card_energy * position_weight * numerology * elemental * astrology * card_type_weight;
        total_energy += energy;
        max_possible_energy += MAX_MANUAL_CONTRIBUTION;

        factors.push(PlacementFactors {
            card_id: r.card.id.clone(),
            position_id: r.position.id.clone(),
            is_reversed: r.placement.is_reversed,
            card_energy,
            position_weight,
            numerology,
            elemental,
            astrology,
            card_type_weight,
            energy,
        });
    }

    let synergy = synergy_bonus(&drawn, cards);
    let eigenvalue = if max_possible_energy == 0.0 {
        0.0
    } else {
        clamp_unit((total_energy + synergy) / max_possible_energy)
    };

    ScoreBreakdown {
        placements: factors,
        skipped: placements.len() - resolved.len(),
        total_energy,
        synergy_bonus: synergy,
        max_possible_energy,
        eigenvalue,
    }
}

/// AI-assisted reading eigenvalue in `[0, 1]`.
pub fn calculate_eigenvalue_ai(
    placements: &[CardPlacement],
    cards: &[Card],
    positions: &[SpreadPosition],
    ai_confidence: f32,
) -> f64 {
    let resolved = resolve_placements(placements, cards, positions);
    if resolved.is_empty() {
        return 0.0;
    }
    let drawn: Vec<CardPlacement> = resolved.iter().map(|r| r.placement.clone()).collect();
    let confidence = confidence_factor(ai_confidence);

    let mut total_energy = 0.0;
    let mut max_possible_energy = 0.0;
    for r in &resolved {
        total_energy += card_energy_signed(r.card, r.placement.is_reversed)
            * position_weight(r.position.position_index)
            * numerology_factor(r.card.numerology.as_deref())
            * elemental_factor(r.card, r.position, cards, &drawn)
            * astrology_factor(r.card.astrology.as_deref())
            * confidence;
        max_possible_energy += MAX_AI_CONTRIBUTION;
    }

    let card_count = resolved.len();
    total_energy += detection_quality_bonus(ai_confidence, card_count);

    let normalized = total_energy / max_possible_energy;
    clamp_unit(normalized * card_count_multiplier(card_count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Arcana, Element, Suit};

    fn three_positions() -> Vec<SpreadPosition> {
        vec![
            SpreadPosition::new("p0", "three", 0, "Past"),
            SpreadPosition::new("p1", "three", 1, "Present"),
            SpreadPosition::new("p2", "three", 2, "Future"),
        ]
    }

    fn fool() -> Card {
        Card::new("major_00_the_fool", "The Fool", Arcana::Major)
            .numerology("0")
            .astrology("Uranus")
            .keywords(&["beginnings", "innocence", "spontaneity"], &["recklessness"])
    }

    #[test]
    fn max_contributions() {
        assert!((MAX_MANUAL_CONTRIBUTION - 2.0 * 1.6 * 1.3 * 1.4 * 1.6).abs() < 1e-12);
        assert!((MAX_AI_CONTRIBUTION - 2.0 * 1.6 * 1.3 * 1.4).abs() < 1e-12);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(calculate_eigenvalue(&[], &[], &[]), 0.0);
        for c in [0.0, 0.5, 0.99, f32::NAN] {
            assert_eq!(calculate_eigenvalue_ai(&[], &[], &[], c), 0.0);
        }
    }

    #[test]
    fn lone_fool_matches_hand_calculation() {
        let placements = vec![CardPlacement::upright("major_00_the_fool", "p0")];
        let b = explain_manual(&placements, &[fool()], &three_positions());

        let f = &b.placements[0];
        // 1.3 * 0.8 clamps to 1.0
        assert_eq!(f.card_energy, 1.0);
        assert_eq!(f.position_weight, 2.0);
        assert_eq!(f.numerology, 1.0);
        assert_eq!(f.elemental, 1.0);
        assert_eq!(f.astrology, 1.0);
        assert_eq!(f.card_type_weight, 1.3);
        assert_eq!(b.synergy_bonus, 0.0);

        let expected = (1.0 * 2.0 * 1.0 * 1.0 * 1.0 * 1.3) / (1.0 * 2.0 * 1.6 * 1.3 * 1.4 * 1.6);
        assert!((b.eigenvalue - expected).abs() < 1e-12);
    }

    #[test]
    fn unresolved_placements_are_ignored() {
        let cards = vec![
            fool(),
            Card::new("cups_02", "Two of Cups", Arcana::Minor)
                .suit(Suit::Cups)
                .element(Element::Water)
                .keywords(&["love", "harmony"], &["conflict"]),
        ];
        let base = vec![
            CardPlacement::upright("major_00_the_fool", "p0"),
            CardPlacement::reversed("cups_02", "p1"),
        ];
        let mut noisy = base.clone();
        noisy.push(CardPlacement::upright("no_such_card", "p2"));
        noisy.push(CardPlacement::upright("cups_02", "no_such_position"));

        let positions = three_positions();
        assert_eq!(
            calculate_eigenvalue(&base, &cards, &positions),
            calculate_eigenvalue(&noisy, &cards, &positions)
        );
        assert_eq!(
            calculate_eigenvalue_ai(&base, &cards, &positions, 0.9),
            calculate_eigenvalue_ai(&noisy, &cards, &positions, 0.9)
        );
        assert_eq!(explain_manual(&noisy, &cards, &positions).skipped, 2);
    }

    #[test]
    fn ai_variant_lone_fool() {
        let placements = vec![CardPlacement::upright("major_00_the_fool", "p0")];
        let v = calculate_eigenvalue_ai(&placements, &[fool()], &three_positions(), 0.9);
        // energy 1.0 (1.04 + 0.1 clamped) * 2.0, one card → ×0.7
        let expected = 2.0 / MAX_AI_CONTRIBUTION * 0.7;
        assert!((v - expected).abs() < 1e-12);

        let low = calculate_eigenvalue_ai(&placements, &[fool()], &three_positions(), 0.1);
        assert!((low - expected * 0.5).abs() < 1e-12);
    }

    #[test]
    fn ai_bonus_joins_before_normalization_and_multiplier_after() {
        // Plain minors: no keywords, element, numerology or astrology, so every factor is 1.0.
        let cards: Vec<Card> = (0..4)
            .map(|i| Card::new(&format!("minor_{i}"), "Plain", Arcana::Minor))
            .collect();
        let mut positions = three_positions();
        positions.push(SpreadPosition::new("p3", "three", 3, "Outcome"));
        let placements: Vec<CardPlacement> = (0..4)
            .map(|i| CardPlacement::upright(&format!("minor_{i}"), &format!("p{i}")))
            .collect();

        let energy = card_energy_signed(&cards[0], false);
        assert!((energy - 0.9).abs() < 1e-12);
        let sum: f64 = (0..4).map(|i| energy * position_weight(i)).sum();
        let bonus = detection_quality_bonus(0.9, 4);
        let max = 4.0 * MAX_AI_CONTRIBUTION;
        let mult = card_count_multiplier(4);
        assert!((bonus - 0.2).abs() < 1e-12);
        assert_eq!(mult, 1.1);

        let v = calculate_eigenvalue_ai(&placements, &cards, &positions, 0.9);
        assert!((v - (sum + bonus) / max * mult).abs() < 1e-12);
        assert!((v - (sum / max + bonus)).abs() > 1e-6);
        assert!((v - (sum / max * mult + bonus)).abs() > 1e-6);

        // three cards: bonus 0.1, multiplier 1.0
        let v3 = calculate_eigenvalue_ai(&placements[..3], &cards, &positions, 0.9);
        let sum3: f64 = (0..3).map(|i| energy * position_weight(i)).sum();
        let expected3 = (sum3 + 0.1) / (3.0 * MAX_AI_CONTRIBUTION);
        assert!((v3 - expected3).abs() < 1e-12);
        assert!((v3 - (sum3 / (3.0 * MAX_AI_CONTRIBUTION) + 0.1)).abs() > 1e-6);
    }
}
