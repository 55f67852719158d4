//! # Catalog
//!
//! Built-in reference data: the 78-card Rider–Waite deck and the stock spreads.
//!
//! - Major Arcana and spreads are embedded JSON (`data/*.json`), parsed once.
//! - Minor Arcana are generated from the rank/suit tables below: ids look like
//!   `cups_03`, `wands_ace`, `swords_king`; numbered cards carry their decan sign.
//!
//! Callers that bring their own deck never touch this module; the API only falls
//! back to it when a request omits cards or positions.

use once_cell::sync::Lazy;

use crate::model::{Arcana, Card, Element, Spread, SpreadPosition, Suit};

pub const DEFAULT_DECK_ID: &str = "rider_waite";

static MAJOR_ARCANA: Lazy<Vec<Card>> = Lazy::new(|| {
    let raw = include_str!("../data/major_arcana.json");
    serde_json::from_str::<Vec<Card>>(raw).expect("valid major arcana data")
});

static SPREADS: Lazy<Vec<Spread>> = Lazy::new(|| {
    let raw = include_str!("../data/spreads.json");
    serde_json::from_str::<Vec<Spread>>(raw).expect("valid spread data")
});

static DECK: Lazy<Vec<Card>> = Lazy::new(|| {
    let mut deck = MAJOR_ARCANA.clone();
    for suit in Suit::ALL {
        for rank in &RANKS {
            deck.push(minor_card(suit, rank));
        }
    }
    deck
});

struct Rank {
    slug: &'static str,
    name: &'static str,
    numerology: Option<&'static str>,
    upright: [&'static str; 3],
    reversed: [&'static str; 2],
    theme: &'static str,
}

const RANKS: [Rank; 14] = [
    Rank {
        slug: "ace",
        name: "Ace",
        numerology: Some("1"),
        upright: ["new beginnings", "potential", "opportunity"],
        reversed: ["missed chance", "delay"],
        theme: "A seed of",
    },
    Rank {
        slug: "02",
        name: "Two",
        numerology: Some("2"),
        upright: ["balance", "partnership", "choices"],
        reversed: ["imbalance", "indecision"],
        theme: "A choice within",
    },
    Rank {
        slug: "03",
        name: "Three",
        numerology: Some("3"),
        upright: ["growth", "collaboration", "expansion"],
        reversed: ["setbacks", "disharmony"],
        theme: "Early growth in",
    },
    Rank {
        slug: "04",
        name: "Four",
        numerology: Some("4"),
        upright: ["stability", "rest", "foundation"],
        reversed: ["restlessness", "stagnation"],
        theme: "Consolidation of",
    },
    Rank {
        slug: "05",
        name: "Five",
        numerology: Some("5"),
        upright: ["conflict", "change", "challenge"],
        reversed: ["recovery", "release"],
        theme: "Upset and friction in",
    },
    Rank {
        slug: "06",
        name: "Six",
        numerology: Some("6"),
        upright: ["harmony", "support", "progress"],
        reversed: ["dependence", "nostalgia"],
        theme: "Restored flow in",
    },
    Rank {
        slug: "07",
        name: "Seven",
        numerology: Some("7"),
        upright: ["reflection", "assessment", "perseverance"],
        reversed: ["doubt", "confusion"],
        theme: "A test of",
    },
    Rank {
        slug: "08",
        name: "Eight",
        numerology: Some("8"),
        upright: ["movement", "mastery", "effort"],
        reversed: ["restriction", "frustration"],
        theme: "Momentum in",
    },
    Rank {
        slug: "09",
        name: "Nine",
        numerology: Some("9"),
        upright: ["fulfillment", "resilience", "near completion"],
        reversed: ["anxiety", "exhaustion"],
        theme: "The near peak of",
    },
    Rank {
        slug: "10",
        name: "Ten",
        numerology: Some("10"),
        upright: ["completion", "culmination", "legacy"],
        reversed: ["burden", "endings"],
        theme: "The full weight of",
    },
    Rank {
        slug: "page",
        name: "Page",
        numerology: None,
        upright: ["curiosity", "learning", "messages"],
        reversed: ["immaturity", "distraction"],
        theme: "A student of",
    },
    Rank {
        slug: "knight",
        name: "Knight",
        numerology: None,
        upright: ["action", "pursuit", "drive"],
        reversed: ["haste", "recklessness"],
        theme: "A charge toward",
    },
    Rank {
        slug: "queen",
        name: "Queen",
        numerology: None,
        upright: ["nurturing", "intuition", "maturity"],
        reversed: ["insecurity", "dependence"],
        theme: "Inner command of",
    },
    Rank {
        slug: "king",
        name: "King",
        numerology: None,
        upright: ["mastery", "leadership", "authority"],
        reversed: ["control", "rigidity"],
        theme: "Outer command of",
    },
];

fn suit_element(suit: Suit) -> Element {
    match suit {
        Suit::Wands => Element::Fire,
        Suit::Cups => Element::Water,
        Suit::Swords => Element::Air,
        Suit::Pentacles => Element::Earth,
    }
}

fn suit_domain(suit: Suit) -> &'static str {
    match suit {
        Suit::Wands => "passion and drive",
        Suit::Cups => "emotion and relationships",
        Suit::Swords => "thought and conflict",
        Suit::Pentacles => "work and material life",
    }
}

/// Decan sign for numbered cards (2–4, 5–7, 8–10).
fn decan_sign(suit: Suit, numerology: Option<&str>) -> Option<&'static str> {
    let n: u32 = numerology?.parse().ok()?;
    let signs = match suit {
        Suit::Wands => ["Aries", "Leo", "Sagittarius"],
        Suit::Cups => ["Cancer", "Scorpio", "Pisces"],
        Suit::Swords => ["Libra", "Aquarius", "Gemini"],
        Suit::Pentacles => ["Capricorn", "Taurus", "Virgo"],
    };
    match n {
        2..=4 => Some(signs[0]),
        5..=7 => Some(signs[1]),
        8..=10 => Some(signs[2]),
        _ => None,
    }
}

fn title_case(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

fn minor_card(suit: Suit, rank: &Rank) -> Card {
    let suit_name = title_case(suit.as_str());
    let domain = suit_domain(suit);
    let mut card = Card::new(
        format!("{}_{}", suit.as_str(), rank.slug),
        format!("{} of {}", rank.name, suit_name),
        Arcana::Minor,
    )
    .suit(suit)
    .element(suit_element(suit))
    .keywords(&rank.upright, &rank.reversed)
    .meanings(
        format!("{} {}.", rank.theme, domain),
        format!("{} {}, blocked or turned inward.", rank.theme, domain),
    );
    if let Some(n) = rank.numerology {
        card = card.numerology(n);
    }
    if let Some(sign) = decan_sign(suit, rank.numerology) {
        card = card.astrology(sign);
    }
    card
}

/// The full 78-card deck, Major Arcana first.
pub fn cards() -> &'static [Card] {
    &DECK
}

pub fn card(id: &str) -> Option<&'static Card> {
    DECK.iter().find(|c| c.id == id)
}

pub fn spreads() -> &'static [Spread] {
    &SPREADS
}

pub fn spread(id: &str) -> Option<&'static Spread> {
    SPREADS.iter().find(|s| s.id == id)
}

/// Positions of a built-in spread; empty for unknown ids.
pub fn positions_for(spread_id: &str) -> &'static [SpreadPosition] {
    spread(spread_id).map(|s| s.positions.as_slice()).unwrap_or(&[])
}
