//! Elemental Compatibility Matrix.
//!
//! Rows are the card's element, columns the element it is compared with.
//! The matrix is authored as-is and is not symmetric: Air→Earth is `0.8`
//! while Earth→Air carries the opposite-element `0.7`.

use crate::model::{Card, CardPlacement, Element, SpreadPosition};

pub const NEUTRAL_ELEMENTAL: f64 = 1.0;

//                               Fire  Water  Air   Earth
const COMPATIBILITY: [[f64; 4]; 4] = [
    /* Fire  */ [1.3, 0.7, 1.2, 0.9],
    /* Water */ [0.7, 1.3, 0.9, 1.2],
    /* Air   */ [1.2, 0.9, 1.3, 0.8],
    /* Earth */ [0.9, 1.2, 0.7, 1.3],
];

/// Compatibility of `from` towards `to`.
pub fn compatibility(from: Element, to: Element) -> f64 {
    COMPATIBILITY[from.idx()][to.idx()]
}

/// Implicit element of a spread position: Fire, Water, Air, Earth, repeating.
pub fn natural_element(position_index: usize) -> Element {
    Element::ALL[position_index % 4]
}

/// Average of (a) card vs. position harmony and (b) mean harmony with every other
/// drawn card that has a resolvable element.
///
/// Neutral when the card has no element; (b) is neutral when no other card
/// contributes an element.
pub fn elemental_factor(
    card: &Card,
    position: &SpreadPosition,
    all_cards: &[Card],
    all_placements: &[CardPlacement],
) -> f64 {
    let Some(element) = card.element else {
        return NEUTRAL_ELEMENTAL;
    };

    let position_harmony = compatibility(element, natural_element(position.position_index));

    let others: Vec<Element> = all_placements
        .iter()
        .filter(|p| p.card_id != card.id)
        .filter_map(|p| all_cards.iter().find(|c| c.id == p.card_id))
        .filter_map(|c| c.element)
        .collect();

    let card_harmony = if others.is_empty() {
        NEUTRAL_ELEMENTAL
    } else {
        others.iter().map(|&o| compatibility(element, o)).sum::<f64>() / others.len() as f64
    };

    (position_harmony + card_harmony) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Arcana;

    fn card(id: &str, el: Option<Element>) -> Card {
        let c = Card::new(id, id, Arcana::Minor);
        match el {
            Some(e) => c.element(e),
            None => c,
        }
    }

    #[test]
    fn diagonal_and_opposites() {
        for e in Element::ALL {
            assert_eq!(compatibility(e, e), 1.3);
        }
        assert_eq!(compatibility(Element::Fire, Element::Water), 0.7);
        assert_eq!(compatibility(Element::Water, Element::Fire), 0.7);
        assert_eq!(compatibility(Element::Earth, Element::Air), 0.7);
    }

    #[test]
    fn matrix_is_kept_as_authored() {
        assert_eq!(compatibility(Element::Air, Element::Earth), 0.8);
        assert_ne!(
            compatibility(Element::Air, Element::Earth),
            compatibility(Element::Earth, Element::Air)
        );
        assert_eq!(compatibility(Element::Fire, Element::Air), 1.2);
        assert_eq!(compatibility(Element::Water, Element::Earth), 1.2);
        assert_eq!(compatibility(Element::Fire, Element::Earth), 0.9);
        assert_eq!(compatibility(Element::Water, Element::Air), 0.9);
    }

    #[test]
    fn natural_element_cycles() {
        assert_eq!(natural_element(0), Element::Fire);
        assert_eq!(natural_element(3), Element::Earth);
        assert_eq!(natural_element(4), Element::Fire);
        assert_eq!(natural_element(9), Element::Water);
    }

    #[test]
    fn no_element_is_neutral() {
        let c = card("a", None);
        let pos = SpreadPosition::new("p0", "s", 0, "Present");
        assert_eq!(elemental_factor(&c, &pos, &[c.clone()], &[]), 1.0);
    }

    #[test]
    fn alone_uses_neutral_card_harmony() {
        let c = card("a", Some(Element::Water));
        let pos = SpreadPosition::new("p0", "s", 0, "Present"); // Fire
        let placements = vec![CardPlacement::upright("a", "p0")];
        let f = elemental_factor(&c, &pos, &[c.clone()], &placements);
        assert!((f - (0.7 + 1.0) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn averages_over_other_cards_including_same_element() {
        let a = card("a", Some(Element::Fire));
        let b = card("b", Some(Element::Fire));
        let c = card("c", Some(Element::Water));
        let d = card("d", None);
        let cards = vec![a.clone(), b, c, d];
        let placements = vec![
            CardPlacement::upright("a", "p2"),
            CardPlacement::upright("b", "p0"),
            CardPlacement::upright("c", "p1"),
            CardPlacement::upright("d", "p3"),
        ];
        let pos = SpreadPosition::new("p2", "s", 2, "Future"); // Air
        let f = elemental_factor(&a, &pos, &cards, &placements);
        let expected = (1.2 + (1.3 + 0.7) / 2.0) / 2.0;
        assert!((f - expected).abs() < 1e-12);
    }
}
