//! # Reading Engine
//! Glue between the HTTP layer and the pure scorer: resolves reference data,
//! scores once, interprets, and journals. Handlers stay thin.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::catalog::{self, DEFAULT_DECK_ID};
use crate::detection::{resolve_detections, CardDetector, DetectionBatch, UnavailableDetector};
use crate::eigen::{
    explain_manual, resolve_placements, ReadingInput, ScoreBreakdown, ScoringStrategy,
};
use crate::interpret::{Interpretation, InterpretationRequest, Interpreter};
use crate::journal::{Journal, NewReading};
use crate::metrics::{record_reading_created, record_score};
use crate::model::{Card, CardPlacement, Reading, SpreadPosition};

/// Spread id recorded when a request brings its own positions without naming a spread.
pub const CUSTOM_SPREAD_ID: &str = "custom";

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    UnknownSpread(String),
    MissingPositions,
    InvalidConfidence(f32),
    EmptyImage,
    Detector(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::UnknownSpread(id) => write!(f, "unknown spread: {id}"),
            EngineError::MissingPositions => {
                f.write_str("either positions or spreadId is required")
            }
            EngineError::InvalidConfidence(c) => {
                write!(f, "detection confidence must be within [0, 1], got {c}")
            }
            EngineError::EmptyImage => f.write_str("image body is empty"),
            EngineError::Detector(e) => write!(f, "card detection failed: {e}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// Body of `/score`, `/score/explain` and `/readings`.
///
/// `cards` defaults to the built-in deck; `positions` default to the named spread.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingRequest {
    #[serde(default)]
    pub strategy: Option<ScoringStrategy>,
    #[serde(default)]
    pub deck_id: Option<String>,
    #[serde(default)]
    pub spread_id: Option<String>,
    #[serde(default)]
    pub placements: Vec<CardPlacement>,
    #[serde(default)]
    pub cards: Option<Vec<Card>>,
    #[serde(default)]
    pub positions: Option<Vec<SpreadPosition>>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body of `/readings/detect`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionRequest {
    pub batch: DetectionBatch,
    #[serde(default)]
    pub deck_id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query of `/readings/photo`; the body is the raw image.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoRequest {
    #[serde(default)]
    pub deck_id: Option<String>,
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreOutcome {
    pub eigenvalue: f64,
    pub strategy: ScoringStrategy,
    pub resolved: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReading {
    pub reading: Reading,
    pub interpretation_source: crate::interpret::InterpretationSource,
    /// Detector labels that did not make it into the reading.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<String>,
}

struct Reference<'a> {
    spread_id: String,
    cards: &'a [Card],
    positions: &'a [SpreadPosition],
}

fn reference(req: &ReadingRequest) -> Result<Reference<'_>, EngineError> {
    let cards: &[Card] = match &req.cards {
        Some(c) => c,
        None => catalog::cards(),
    };
    let positions: &[SpreadPosition] = match (&req.positions, &req.spread_id) {
        (Some(p), _) => p,
        (None, Some(id)) => catalog::spread(id)
            .map(|s| s.positions.as_slice())
            .ok_or_else(|| EngineError::UnknownSpread(id.clone()))?,
        (None, None) => return Err(EngineError::MissingPositions),
    };
    let spread_id = req
        .spread_id
        .clone()
        .or_else(|| positions.first().map(|p| p.spread_id.clone()))
        .unwrap_or_else(|| CUSTOM_SPREAD_ID.to_string());
    Ok(Reference {
        spread_id,
        cards,
        positions,
    })
}

fn validate(strategy: ScoringStrategy) -> Result<ScoringStrategy, EngineError> {
    match strategy {
        ScoringStrategy::AiAssisted { confidence } if !(0.0..=1.0).contains(&confidence) => {
            Err(EngineError::InvalidConfidence(confidence))
        }
        s => Ok(s),
    }
}

/// Short, non-reversible fingerprint for logging free text.
pub fn anon_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    digest[..6].iter().map(|b| format!("{b:02x}")).collect()
}

pub struct ReadingEngine {
    journal: Arc<Journal>,
    interpreter: Interpreter,
    detector: Arc<dyn CardDetector>,
    default_strategy: ScoringStrategy,
}

impl ReadingEngine {
    pub fn new(
        journal: Arc<Journal>,
        interpreter: Interpreter,
        default_strategy: ScoringStrategy,
    ) -> Self {
        Self {
            journal,
            interpreter,
            detector: Arc::new(UnavailableDetector),
            default_strategy,
        }
    }

    pub fn with_detector(mut self, detector: Arc<dyn CardDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn detector_name(&self) -> &'static str {
        self.detector.name()
    }

    pub fn interpreter_name(&self) -> &'static str {
        self.interpreter.provider_name()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn default_strategy(&self) -> ScoringStrategy {
        self.default_strategy
    }

    fn strategy_for(&self, req: &ReadingRequest) -> Result<ScoringStrategy, EngineError> {
        validate(req.strategy.unwrap_or(self.default_strategy))
    }

    /// Score without journaling.
    pub fn score(&self, req: &ReadingRequest) -> Result<ScoreOutcome, EngineError> {
        let strategy = self.strategy_for(req)?;
        let r = reference(req)?;
        Ok(score_with(strategy, &req.placements, &r))
    }

    /// Factor-by-factor breakdown of the manual formula.
    pub fn explain(&self, req: &ReadingRequest) -> Result<ScoreBreakdown, EngineError> {
        let r = reference(req)?;
        Ok(explain_manual(&req.placements, r.cards, r.positions))
    }

    /// Score once, interpret, and journal.
    pub async fn create_reading(&self, req: ReadingRequest) -> Result<CreatedReading, EngineError> {
        let strategy = self.strategy_for(&req)?;
        let r = reference(&req)?;
        let deck_id = req.deck_id.clone().unwrap_or_else(|| DEFAULT_DECK_ID.to_string());
        self.finish(
            strategy,
            deck_id,
            &r,
            req.placements.clone(),
            req.question.clone(),
            req.notes.clone(),
            Vec::new(),
        )
        .await
    }

    /// Map detector output onto a built-in spread and journal an AI-assisted reading.
    pub async fn create_from_detection(
        &self,
        req: DetectionRequest,
    ) -> Result<CreatedReading, EngineError> {
        let spread = catalog::spread(&req.batch.spread_id)
            .ok_or_else(|| EngineError::UnknownSpread(req.batch.spread_id.clone()))?;
        let detected = resolve_detections(&req.batch, catalog::cards(), &spread.positions);
        debug!(
            spread_id = %spread.id,
            accepted = detected.placements.len(),
            dropped = detected.dropped.len(),
            confidence = detected.confidence,
            "detections resolved"
        );

        let r = Reference {
            spread_id: spread.id.clone(),
            cards: catalog::cards(),
            positions: &spread.positions,
        };
        let strategy = ScoringStrategy::AiAssisted {
            confidence: detected.confidence,
        };
        let deck_id = req.deck_id.unwrap_or_else(|| DEFAULT_DECK_ID.to_string());
        self.finish(
            strategy,
            deck_id,
            &r,
            detected.placements,
            req.question,
            req.notes,
            detected.dropped,
        )
        .await
    }

    /// Run the configured detector on a photo, then continue as [`Self::create_from_detection`].
    pub async fn create_from_photo(
        &self,
        image: &[u8],
        req: PhotoRequest,
    ) -> Result<CreatedReading, EngineError> {
        if image.is_empty() {
            return Err(EngineError::EmptyImage);
        }
        let batch = self.detector.detect(image).await.map_err(|e| {
            warn!(detector = self.detector.name(), error = %e, "card detection failed");
            EngineError::Detector(e.to_string())
        })?;
        debug!(
            detector = self.detector.name(),
            bytes = image.len(),
            detections = batch.detections.len(),
            "photo detected"
        );
        self.create_from_detection(DetectionRequest {
            batch,
            deck_id: req.deck_id,
            question: req.question,
            notes: req.notes,
        })
        .await
    }

    #[allow(clippy::too_many_arguments)]
    async fn finish(
        &self,
        strategy: ScoringStrategy,
        deck_id: String,
        r: &Reference<'_>,
        placements: Vec<CardPlacement>,
        question: Option<String>,
        notes: Option<String>,
        dropped: Vec<String>,
    ) -> Result<CreatedReading, EngineError> {
        let outcome = score_with(strategy, &placements, r);

        let Interpretation { text, source, .. } = self
            .interpreter
            .interpret(&InterpretationRequest {
                question: question.as_deref(),
                placements: &placements,
                cards: r.cards,
                positions: r.positions,
                eigenvalue: outcome.eigenvalue,
            })
            .await;

        let reading = self.journal.record(NewReading {
            deck_id,
            spread_id: r.spread_id.clone(),
            placements,
            question,
            interpretation: text,
            eigenvalue: Some(outcome.eigenvalue),
            notes,
            method: strategy,
        });
        record_reading_created(strategy.name());
        info!(
            id = reading.id,
            strategy = %strategy,
            eigenvalue = outcome.eigenvalue,
            question = %reading.question.as_deref().map(anon_hash).unwrap_or_default(),
            "reading recorded"
        );

        Ok(CreatedReading {
            reading,
            interpretation_source: source,
            dropped,
        })
    }
}

fn score_with(
    strategy: ScoringStrategy,
    placements: &[CardPlacement],
    r: &Reference<'_>,
) -> ScoreOutcome {
    let resolved = resolve_placements(placements, r.cards, r.positions).len();
    let eigenvalue = strategy.score(&ReadingInput::new(placements, r.cards, r.positions));
    record_score(strategy.name(), eigenvalue);
    ScoreOutcome {
        eigenvalue,
        strategy,
        resolved,
        skipped: placements.len() - resolved,
    }
}
