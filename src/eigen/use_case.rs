//! Simplified per-reading scorer.
//!
//! `Σ(energy × order_weight × numerology × elemental) / Σ(order_weight) + pairwise synergy`,
//! clamped to `[0, 1]`. Numerology here parses the label to an integer (1–9),
//! unlike the string-keyed table used by the eigenvalue calculators.

use super::synergy::pairwise_synergy;
use super::{clamp_unit, resolve_placements};
use crate::model::{Arcana, Card, CardPlacement, Element, SpreadPosition};

const MAJOR_BASE_ENERGY: f64 = 0.6;
const MINOR_BASE_ENERGY: f64 = 0.5;
const ORIENTATION_TERM: f64 = 0.1;
const KEYWORD_STEP: f64 = 0.02;
const KEYWORD_CAP: f64 = 0.1;

/// Arcana base ± orientation term + keyword-count term, clamped to `[0, 1]`.
pub fn use_case_card_energy(card: &Card, is_reversed: bool) -> f64 {
    let base = match card.arcana {
        Arcana::Major => MAJOR_BASE_ENERGY,
        Arcana::Minor => MINOR_BASE_ENERGY,
    };
    let orientation = if is_reversed {
        -ORIENTATION_TERM
    } else {
        ORIENTATION_TERM
    };
    let keywords = (KEYWORD_STEP * card.keywords_for(is_reversed).len() as f64).min(KEYWORD_CAP);
    (base + orientation + keywords).clamp(0.0, 1.0)
}

/// `1 - order / (2 * total)`, never negative; `1.0` when the spread size is unknown.
pub fn position_order_weight(position_order: usize, total_positions: usize) -> f64 {
    if total_positions == 0 {
        return 1.0;
    }
    (1.0 - position_order as f64 / (2.0 * total_positions as f64)).max(0.0)
}

/// Small bonus for single-digit numerology labels; anything else is neutral.
pub fn numerology_bonus(label: Option<&str>) -> f64 {
    match label.and_then(|l| l.trim().parse::<u32>().ok()) {
        Some(1) => 1.1,
        Some(2) => 1.03,
        Some(3) => 1.05,
        Some(4) => 1.04,
        Some(5) => 1.06,
        Some(6) => 1.05,
        Some(7) => 1.08,
        Some(8) => 1.07,
        Some(9) => 1.1,
        _ => 1.0,
    }
}

pub fn elemental_bonus(element: Option<Element>) -> f64 {
    match element {
        Some(Element::Fire) => 1.08,
        Some(Element::Water) => 1.06,
        Some(Element::Air) => 1.05,
        Some(Element::Earth) => 1.07,
        None => 1.0,
    }
}

/// Use-case eigenvalue in `[0, 1]`.
///
/// The spread size for the order weight is the number of supplied positions that
/// belong to the same spread as the placement's position.
pub fn calculate_use_case_eigenvalue(
    placements: &[CardPlacement],
    cards: &[Card],
    positions: &[SpreadPosition],
) -> f64 {
    let resolved = resolve_placements(placements, cards, positions);

    let mut weighted = 0.0;
    let mut weight_sum = 0.0;
    for r in &resolved {
        let total = positions
            .iter()
            .filter(|p| p.spread_id == r.position.spread_id)
            .count();
        let w = position_order_weight(r.position.position_index, total);
        weighted += use_case_card_energy(r.card, r.placement.is_reversed)
            * w
            * numerology_bonus(r.card.numerology.as_deref())
            * elemental_bonus(r.card.element);
        weight_sum += w;
    }

    if weight_sum <= 0.0 {
        return 0.0;
    }

    let drawn: Vec<CardPlacement> = resolved.iter().map(|r| r.placement.clone()).collect();
    clamp_unit(weighted / weight_sum + pairwise_synergy(&drawn, cards))
}
