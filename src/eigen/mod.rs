// src/eigen/mod.rs
//! Reading Score Calculator ("eigenvalue").
//!
//! Pure, deterministic functions over value records: no I/O, no shared mutable
//! state, safe to call from any thread. Every entry point returns a finite score
//! in `[0, 1]`; placements whose card or position cannot be resolved are skipped.
//!
//! Three formulas coexist and are selected explicitly by the caller through
//! [`ScoringStrategy`]:
//! - `Manual`      → [`calculate_eigenvalue`]
//! - `AiAssisted`  → [`calculate_eigenvalue_ai`]
//! - `UseCase`     → [`calculate_use_case_eigenvalue`]

pub mod astrology;
pub mod calculator;
pub mod confidence;
pub mod elements;
pub mod energy;
pub mod numerology;
pub mod position;
pub mod synergy;
pub mod use_case;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

use crate::model::{Card, CardPlacement, SpreadPosition};

// Re-export convenient entry points.
pub use calculator::{
    calculate_eigenvalue, calculate_eigenvalue_ai, explain_manual, PlacementFactors,
    ScoreBreakdown,
};
pub use use_case::calculate_use_case_eigenvalue;

/// Borrowed snapshot of everything a scorer needs.
#[derive(Debug, Clone, Copy)]
pub struct ReadingInput<'a> {
    pub placements: &'a [CardPlacement],
    pub cards: &'a [Card],
    pub positions: &'a [SpreadPosition],
}

impl<'a> ReadingInput<'a> {
    pub fn new(
        placements: &'a [CardPlacement],
        cards: &'a [Card],
        positions: &'a [SpreadPosition],
    ) -> Self {
        Self {
            placements,
            cards,
            positions,
        }
    }
}

/// Which scoring formula a caller wants. Also recorded on journaled readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringStrategy {
    Manual,
    AiAssisted { confidence: f32 },
    UseCase,
}

impl ScoringStrategy {
    pub fn score(&self, input: &ReadingInput<'_>) -> f64 {
        match *self {
            ScoringStrategy::Manual => {
                calculate_eigenvalue(input.placements, input.cards, input.positions)
            }
            ScoringStrategy::AiAssisted { confidence } => {
                calculate_eigenvalue_ai(input.placements, input.cards, input.positions, confidence)
            }
            ScoringStrategy::UseCase => {
                calculate_use_case_eigenvalue(input.placements, input.cards, input.positions)
            }
        }
    }

    /// Stable label for logs and metrics.
    pub fn name(&self) -> &'static str {
        match self {
            ScoringStrategy::Manual => "manual",
            ScoringStrategy::AiAssisted { .. } => "ai_assisted",
            ScoringStrategy::UseCase => "use_case",
        }
    }
}

impl fmt::Display for ScoringStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses the confidence-free strategies (`manual`, `use_case`).
impl FromStr for ScoringStrategy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "manual" => Ok(ScoringStrategy::Manual),
            "use_case" | "usecase" => Ok(ScoringStrategy::UseCase),
            "ai_assisted" => anyhow::bail!("ai_assisted needs a detection confidence"),
            other => anyhow::bail!("unknown scoring strategy: {other}"),
        }
    }
}

/// A placement whose card and position were both found.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Resolved<'a> {
    pub placement: &'a CardPlacement,
    pub card: &'a Card,
    pub position: &'a SpreadPosition,
}

/// Resolve placements in order, dropping those with a dangling card or position.
/// When ids repeat in the reference lists, the first record wins.
pub(crate) fn resolve_placements<'a>(
    placements: &'a [CardPlacement],
    cards: &'a [Card],
    positions: &'a [SpreadPosition],
) -> Vec<Resolved<'a>> {
    let mut card_by_id: HashMap<&str, &Card> = HashMap::with_capacity(cards.len());
    for c in cards {
        card_by_id.entry(c.id.as_str()).or_insert(c);
    }
    let mut position_by_id: HashMap<&str, &SpreadPosition> =
        HashMap::with_capacity(positions.len());
    for p in positions {
        position_by_id.entry(p.id.as_str()).or_insert(p);
    }

    placements
        .iter()
        .filter_map(|placement| {
            let card = card_by_id.get(placement.card_id.as_str());
            let position = position_by_id.get(placement.position_id.as_str());
            match (card, position) {
                (Some(&card), Some(&position)) => Some(Resolved {
                    placement,
                    card,
                    position,
                }),
                _ => {
                    debug!(
                        card_id = %placement.card_id,
                        position_id = %placement.position_id,
                        card_found = card.is_some(),
                        position_found = position.is_some(),
                        "skipping unresolved placement"
                    );
                    None
                }
            }
        })
        .collect()
}

/// NaN-safe clamp to `[0, 1]`.
pub(crate) fn clamp_unit(x: f64) -> f64 {
    if x.is_nan() {
        0.0
    } else {
        x.clamp(0.0, 1.0)
    }
}
