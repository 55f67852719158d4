use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shuttle_axum::axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::catalog;
use crate::eigen::ScoreBreakdown;
use crate::engine::{
    CreatedReading, DetectionRequest, EngineError, PhotoRequest, ReadingEngine, ReadingRequest,
    ScoreOutcome,
};
use crate::metrics::Metrics;
use crate::model::{Card, Reading, Spread};

pub const DEFAULT_LIST_LIMIT: usize = 20;
pub const MAX_LIST_LIMIT: usize = 100;

#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<ReadingEngine>,
}

/// JSON error body: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<EngineError> for ApiError {
    fn from(e: EngineError) -> Self {
        let status = match e {
            EngineError::UnknownSpread(_) => StatusCode::NOT_FOUND,
            EngineError::MissingPositions
            | EngineError::InvalidConfidence(_)
            | EngineError::EmptyImage => StatusCode::BAD_REQUEST,
            EngineError::Detector(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn create_router(state: AppState, metrics: Option<&Metrics>) -> Router {
    let router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/cards", get(list_cards))
        .route("/cards/{id}", get(get_card))
        .route("/spreads", get(list_spreads))
        .route("/spreads/{id}", get(get_spread))
        .route("/score", post(score))
        .route("/score/explain", post(explain))
        .route("/readings", post(create_reading).get(list_readings))
        .route("/readings/detect", post(create_detected_reading))
        .route("/readings/photo", post(create_photo_reading))
        .route("/readings/{id}", get(get_reading))
        .route("/readings/{id}/notes", put(update_notes))
        .layer(CorsLayer::very_permissive())
        .with_state(state);

    match metrics {
        Some(m) => router.merge(m.router()),
        None => router,
    }
}

async fn list_cards() -> Json<&'static [Card]> {
    Json(catalog::cards())
}

async fn get_card(Path(id): Path<String>) -> ApiResult<&'static Card> {
    catalog::card(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("unknown card: {id}")))
}

async fn list_spreads() -> Json<&'static [Spread]> {
    Json(catalog::spreads())
}

async fn get_spread(Path(id): Path<String>) -> ApiResult<&'static Spread> {
    catalog::spread(&id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("unknown spread: {id}")))
}

async fn score(
    State(state): State<AppState>,
    Json(req): Json<ReadingRequest>,
) -> ApiResult<ScoreOutcome> {
    Ok(Json(state.engine.score(&req)?))
}

async fn explain(
    State(state): State<AppState>,
    Json(req): Json<ReadingRequest>,
) -> ApiResult<ScoreBreakdown> {
    Ok(Json(state.engine.explain(&req)?))
}

async fn create_reading(
    State(state): State<AppState>,
    Json(req): Json<ReadingRequest>,
) -> Result<(StatusCode, Json<CreatedReading>), ApiError> {
    let created = state.engine.create_reading(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn create_detected_reading(
    State(state): State<AppState>,
    Json(req): Json<DetectionRequest>,
) -> Result<(StatusCode, Json<CreatedReading>), ApiError> {
    let created = state.engine.create_from_detection(req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Raw image body; deck, question and notes ride in the query string.
async fn create_photo_reading(
    State(state): State<AppState>,
    Query(req): Query<PhotoRequest>,
    image: Bytes,
) -> Result<(StatusCode, Json<CreatedReading>), ApiError> {
    let created = state.engine.create_from_photo(&image, req).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Deserialize)]
struct ListQuery {
    limit: Option<usize>,
}

async fn list_readings(
    State(state): State<AppState>,
    Query(q): Query<ListQuery>,
) -> Json<Vec<Reading>> {
    let n = q.limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    Json(state.engine.journal().last_n(n))
}

async fn get_reading(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Reading> {
    state
        .engine
        .journal()
        .get(id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("unknown reading: {id}")))
}

#[derive(Deserialize)]
struct NotesBody {
    notes: Option<String>,
}

async fn update_notes(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(body): Json<NotesBody>,
) -> ApiResult<Reading> {
    state
        .engine
        .journal()
        .update_notes(id, body.notes)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("unknown reading: {id}")))
}
