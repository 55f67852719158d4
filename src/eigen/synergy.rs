//! Synergy / interaction bonuses between drawn cards.
//!
//! Two independent formulas:
//! - [`synergy_bonus`]: Major Arcana cluster, suit dominance and uniform
//!   orientation (manual eigenvalue). Capped at [`SYNERGY_CAP`].
//! - [`pairwise_synergy`]: mean pairwise affinity over shared arcana, element
//!   and suit (use-case calculator).

use crate::model::{Card, CardPlacement, Suit};

pub const SYNERGY_CAP: f64 = 0.5;

pub const MAJOR_CLUSTER_STEP: f64 = 0.2;
pub const SUIT_DOMINANCE_STEP: f64 = 0.15;
pub const ALL_REVERSED_BONUS: f64 = 0.1;
pub const ALL_UPRIGHT_BONUS: f64 = 0.15;

pub const PAIR_SAME_ARCANA: f64 = 0.02;
pub const PAIR_SAME_ELEMENT: f64 = 0.03;
pub const PAIR_SAME_SUIT: f64 = 0.02;

fn find<'a>(cards: &'a [Card], id: &str) -> Option<&'a Card> {
    cards.iter().find(|c| c.id == id)
}

/// Cluster/dominance bonus added to total energy before normalization.
///
/// Suits are detected by a case-insensitive substring of the card *id*, so a
/// card record with a missing `suit` still counts when its id names one.
pub fn synergy_bonus(placements: &[CardPlacement], cards: &[Card]) -> f64 {
    if placements.len() < 2 {
        return 0.0;
    }

    let mut bonus = 0.0;

    // Major Arcana cluster
    let major_count = placements
        .iter()
        .filter_map(|p| find(cards, &p.card_id))
        .filter(|c| c.is_major())
        .count();
    if major_count >= 3 {
        bonus += MAJOR_CLUSTER_STEP * (major_count - 2) as f64;
    }

    // Suit dominance
    let mut suit_counts = [0usize; 4];
    for p in placements {
        let id = p.card_id.to_lowercase();
        if let Some(i) = Suit::ALL.iter().position(|s| id.contains(s.as_str())) {
            suit_counts[i] += 1;
        }
    }
    let max_suit = suit_counts.iter().copied().max().unwrap_or(0);
    if max_suit >= 3 {
        bonus += SUIT_DOMINANCE_STEP * (max_suit - 2) as f64;
    }

    // Uniform orientation
    if placements.iter().all(|p| p.is_reversed) {
        bonus += ALL_REVERSED_BONUS;
    } else if placements.iter().all(|p| !p.is_reversed) {
        bonus += ALL_UPRIGHT_BONUS;
    }

    bonus.min(SYNERGY_CAP)
}

/// Mean pairwise synergy over every unordered pair of resolvable cards.
pub fn pairwise_synergy(placements: &[CardPlacement], cards: &[Card]) -> f64 {
    let drawn: Vec<&Card> = placements
        .iter()
        .filter_map(|p| find(cards, &p.card_id))
        .collect();
    if drawn.len() < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut pairs = 0usize;
    for (i, a) in drawn.iter().enumerate() {
        for b in &drawn[i + 1..] {
            if a.arcana == b.arcana {
                total += PAIR_SAME_ARCANA;
            }
            if a.element.is_some() && a.element == b.element {
                total += PAIR_SAME_ELEMENT;
            }
            if a.suit.is_some() && a.suit == b.suit {
                total += PAIR_SAME_SUIT;
            }
            pairs += 1;
        }
    }

    total / pairs as f64
}
