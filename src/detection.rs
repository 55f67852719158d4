// src/detection.rs
//! Boundary to the on-device card detector.
//!
//! The detector itself (model loading, inference, box post-processing) lives
//! outside this crate. What arrives here is a list of class labels with
//! confidences; this module turns them into placements for the AI-assisted scorer.
//!
//! Label resolution order: exact card id → normalized id/name → fuzzy name match
//! (`strsim::normalized_levenshtein` ≥ [`FUZZY_THRESHOLD`]). Positions are filled in
//! spread order; labels that match nothing, repeat a card, or overflow the spread
//! are dropped.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strsim::normalized_levenshtein;
use tracing::debug;

use crate::config::DetectorConfig;
use crate::model::{Card, CardPlacement, SpreadPosition};

pub const FUZZY_THRESHOLD: f64 = 0.85;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("label regex"));

/// One detected card as reported by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Detection {
    pub label: String,
    pub confidence: f32,
    #[serde(default)]
    pub is_reversed: bool,
}

/// Detector output for one photographed spread, in reading order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionBatch {
    pub spread_id: String,
    pub detections: Vec<Detection>,
}

/// Placements ready for the AI-assisted scorer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedReading {
    pub placements: Vec<CardPlacement>,
    /// Mean confidence of the accepted detections; `0.0` when none were accepted.
    pub confidence: f32,
    pub dropped: Vec<String>,
}

/// Anything that can turn a photo into detections.
#[async_trait]
pub trait CardDetector: Send + Sync {
    async fn detect(&self, image: &[u8]) -> anyhow::Result<DetectionBatch>;
    fn name(&self) -> &'static str;
}

/// Returns the same batch for every image. Local runs and tests.
#[derive(Debug, Clone)]
pub struct FixedDetector {
    pub batch: DetectionBatch,
}

#[async_trait]
impl CardDetector for FixedDetector {
    async fn detect(&self, _image: &[u8]) -> anyhow::Result<DetectionBatch> {
        Ok(self.batch.clone())
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

impl FixedDetector {
    /// Load the batch from a JSON file shaped like [`DetectionBatch`].
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read detector fixture at {}", path.display()))?;
        let batch = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse detector fixture at {}", path.display()))?;
        Ok(Self { batch })
    }
}

/// Used when no detector is configured; every photo is refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableDetector;

#[async_trait]
impl CardDetector for UnavailableDetector {
    async fn detect(&self, _image: &[u8]) -> anyhow::Result<DetectionBatch> {
        anyhow::bail!("no card detector configured")
    }

    fn name(&self) -> &'static str {
        "unavailable"
    }
}

/// Fixture-backed detector when `detector.fixture_path` is set, otherwise none.
pub fn build_detector_from_config(cfg: &DetectorConfig) -> anyhow::Result<Arc<dyn CardDetector>> {
    match cfg.fixture_path.as_deref().filter(|p| !p.trim().is_empty()) {
        Some(path) => {
            let detector = FixedDetector::from_file(Path::new(path))?;
            debug!(path, spread_id = %detector.batch.spread_id, "fixture detector loaded");
            Ok(Arc::new(detector))
        }
        None => Ok(Arc::new(UnavailableDetector)),
    }
}

fn normalize_label(s: &str) -> String {
    NON_ALNUM
        .replace_all(&s.to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Find the card a detector label refers to.
pub fn match_card<'a>(label: &str, cards: &'a [Card]) -> Option<&'a Card> {
    if let Some(c) = cards.iter().find(|c| c.id == label) {
        return Some(c);
    }

    let wanted = normalize_label(label);
    if wanted.is_empty() {
        return None;
    }
    if let Some(c) = cards
        .iter()
        .find(|c| normalize_label(&c.name) == wanted || normalize_label(&c.id) == wanted)
    {
        return Some(c);
    }

    cards
        .iter()
        .map(|c| (c, normalized_levenshtein(&normalize_label(&c.name), &wanted)))
        .filter(|(_, sim)| *sim >= FUZZY_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

/// Map a detection batch onto cards and the spread's positions.
///
/// Positions are taken from `positions` belonging to `batch.spread_id`, ordered by
/// index; when none belong to it, all supplied positions are used in index order.
pub fn resolve_detections(
    batch: &DetectionBatch,
    cards: &[Card],
    positions: &[SpreadPosition],
) -> DetectedReading {
    let mut slots: Vec<&SpreadPosition> = positions
        .iter()
        .filter(|p| p.spread_id == batch.spread_id)
        .collect();
    if slots.is_empty() {
        slots = positions.iter().collect();
    }
    slots.sort_by_key(|p| p.position_index);

    let mut placements: Vec<CardPlacement> = Vec::new();
    let mut dropped = Vec::new();
    let mut confidence_sum = 0.0f32;

    for det in &batch.detections {
        let Some(card) = match_card(&det.label, cards) else {
            debug!(label = %det.label, "no card matches detector label");
            dropped.push(det.label.clone());
            continue;
        };
        if placements.iter().any(|p| p.card_id == card.id) {
            debug!(card_id = %card.id, "duplicate detection dropped");
            dropped.push(det.label.clone());
            continue;
        }
        let Some(slot) = slots.get(placements.len()) else {
            debug!(label = %det.label, "spread is full; detection dropped");
            dropped.push(det.label.clone());
            continue;
        };

        placements.push(CardPlacement::new(
            card.id.clone(),
            slot.id.clone(),
            det.is_reversed,
        ));
        confidence_sum += det.confidence.clamp(0.0, 1.0);
    }

    let confidence = if placements.is_empty() {
        0.0
    } else {
        confidence_sum / placements.len() as f32
    };

    DetectedReading {
        placements,
        confidence,
        dropped,
    }
}
