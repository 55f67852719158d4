//! model.rs: immutable value records shared by the scorer, the journal and the API.
//!
//! Wire shape is camelCase JSON (`positionIndex`, `isReversed`, ...) so mobile
//! clients can post their records unchanged. The scorer never mutates any of these.

use crate::eigen::ScoringStrategy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Card category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Arcana {
    Major,
    Minor,
}

/// Minor Arcana suits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Suit {
    Wands,
    Cups,
    Swords,
    Pentacles,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Wands, Suit::Cups, Suit::Swords, Suit::Pentacles];

    /// Lower-case name, also the token searched for inside card ids.
    pub fn as_str(self) -> &'static str {
        match self {
            Suit::Wands => "wands",
            Suit::Cups => "cups",
            Suit::Swords => "swords",
            Suit::Pentacles => "pentacles",
        }
    }

    /// Case-insensitive parse; `None` for anything unknown.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        Suit::ALL.into_iter().find(|suit| suit.as_str() == s)
    }
}

/// The four classical elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Water,
    Air,
    Earth,
}

impl Element {
    /// Order matters: a position's natural element is `ALL[index % 4]`.
    pub const ALL: [Element; 4] = [Element::Fire, Element::Water, Element::Air, Element::Earth];

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fire" => Some(Element::Fire),
            "water" => Some(Element::Water),
            "air" => Some(Element::Air),
            "earth" => Some(Element::Earth),
            _ => None,
        }
    }

    /// Row/column index into the compatibility matrix.
    pub(crate) fn idx(self) -> usize {
        match self {
            Element::Fire => 0,
            Element::Water => 1,
            Element::Air => 2,
            Element::Earth => 3,
        }
    }
}

/// A tarot card as stored in the reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub upright_meaning: String,
    #[serde(default)]
    pub reversed_meaning: String,
    #[serde(default)]
    pub upright_keywords: Vec<String>,
    #[serde(default)]
    pub reversed_keywords: Vec<String>,
    /// Numerological label ("0".."22"); kept as a string on purpose.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numerology: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub astrology: Option<String>,
    pub arcana: Arcana,
    /// Only meaningful for Minor Arcana; a missing suit is treated as unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suit: Option<Suit>,
}

impl Card {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arcana: Arcana) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            upright_meaning: String::new(),
            reversed_meaning: String::new(),
            upright_keywords: Vec::new(),
            reversed_keywords: Vec::new(),
            numerology: None,
            element: None,
            astrology: None,
            arcana,
            suit: None,
        }
    }

    pub fn numerology(mut self, label: impl Into<String>) -> Self {
        self.numerology = Some(label.into());
        self
    }

    pub fn element(mut self, element: Element) -> Self {
        self.element = Some(element);
        self
    }

    pub fn astrology(mut self, text: impl Into<String>) -> Self {
        self.astrology = Some(text.into());
        self
    }

    pub fn suit(mut self, suit: Suit) -> Self {
        self.suit = Some(suit);
        self
    }

    pub fn keywords(mut self, upright: &[&str], reversed: &[&str]) -> Self {
        self.upright_keywords = upright.iter().map(|k| k.to_string()).collect();
        self.reversed_keywords = reversed.iter().map(|k| k.to_string()).collect();
        self
    }

    pub fn meanings(mut self, upright: impl Into<String>, reversed: impl Into<String>) -> Self {
        self.upright_meaning = upright.into();
        self.reversed_meaning = reversed.into();
        self
    }

    /// Keyword list for the drawn orientation.
    pub fn keywords_for(&self, is_reversed: bool) -> &[String] {
        if is_reversed {
            &self.reversed_keywords
        } else {
            &self.upright_keywords
        }
    }

    pub fn meaning_for(&self, is_reversed: bool) -> &str {
        if is_reversed {
            &self.reversed_meaning
        } else {
            &self.upright_meaning
        }
    }

    pub fn is_major(&self) -> bool {
        self.arcana == Arcana::Major
    }
}

/// One slot of a spread layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpreadPosition {
    pub id: String,
    pub spread_id: String,
    /// Zero-based ordinal; drives significance and the implicit element.
    pub position_index: usize,
    pub name: String,
    #[serde(default)]
    pub meaning: String,
    /// Layout coordinates for the UI; ignored by the scorer.
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

impl SpreadPosition {
    pub fn new(
        id: impl Into<String>,
        spread_id: impl Into<String>,
        position_index: usize,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            spread_id: spread_id.into(),
            position_index,
            name: name.into(),
            meaning: String::new(),
            x: 0.0,
            y: 0.0,
        }
    }
}

/// A named layout of positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spread {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub positions: Vec<SpreadPosition>,
}

/// Card × position × orientation ("CardDrawing").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardPlacement {
    pub card_id: String,
    pub position_id: String,
    #[serde(default)]
    pub is_reversed: bool,
}

impl CardPlacement {
    pub fn new(
        card_id: impl Into<String>,
        position_id: impl Into<String>,
        is_reversed: bool,
    ) -> Self {
        Self {
            card_id: card_id.into(),
            position_id: position_id.into(),
            is_reversed,
        }
    }

    pub fn upright(card_id: impl Into<String>, position_id: impl Into<String>) -> Self {
        Self::new(card_id, position_id, false)
    }

    pub fn reversed(card_id: impl Into<String>, position_id: impl Into<String>) -> Self {
        Self::new(card_id, position_id, true)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    Upright,
    Reversed,
}

impl Orientation {
    pub fn from_reversed(is_reversed: bool) -> Self {
        if is_reversed {
            Orientation::Reversed
        } else {
            Orientation::Upright
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Orientation::Upright => f.write_str("Upright"),
            Orientation::Reversed => f.write_str("Reversed"),
        }
    }
}

/// A journaled reading. The eigenvalue is computed once at creation and never recomputed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reading {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    pub deck_id: String,
    pub spread_id: String,
    pub placements: Vec<CardPlacement>,
    #[serde(default)]
    pub question: Option<String>,
    pub interpretation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eigenvalue: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub method: ScoringStrategy,
}
