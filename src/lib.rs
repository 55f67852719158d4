// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod catalog;
pub mod config;
pub mod detection;
pub mod eigen;
pub mod engine;
pub mod interpret;
pub mod journal;
pub mod metrics;
pub mod model;

use std::sync::Arc;

use shuttle_axum::axum::Router;
use tracing::info;

pub use crate::api::{create_router, AppState};
pub use crate::config::AppConfig;
pub use crate::detection::CardDetector;
pub use crate::eigen::{
    calculate_eigenvalue, calculate_eigenvalue_ai, calculate_use_case_eigenvalue, ScoringStrategy,
};

/// Wire journal, interpreter, detector and engine from a resolved config.
pub fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let detector = detection::build_detector_from_config(&cfg.detector)?;
    build_state_with_detector(cfg, detector)
}

/// Same as [`build_state`] with an explicit card detector.
pub fn build_state_with_detector(
    cfg: &AppConfig,
    detector: Arc<dyn CardDetector>,
) -> anyhow::Result<AppState> {
    let client = interpret::build_client_from_config(&cfg.interpreter)?;
    let interpreter = interpret::Interpreter::new(client);
    let journal = Arc::new(journal::Journal::with_capacity(cfg.journal.capacity));
    let strategy = cfg.scoring.strategy();
    let engine = engine::ReadingEngine::new(journal, interpreter, strategy).with_detector(detector);

    info!(
        strategy = %strategy,
        journal_capacity = engine.journal().capacity(),
        interpreter = engine.interpreter_name(),
        detector = engine.detector_name(),
        "reading engine ready"
    );

    Ok(AppState {
        engine: Arc::new(engine),
    })
}

/// Full router from a config; `/metrics` is mounted when enabled.
pub fn app_with_config(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = build_state(cfg)?;
    let metrics = cfg.metrics.enabled.then(crate::metrics::Metrics::init);
    Ok(create_router(state, metrics.as_ref()))
}

/// Load `config/tarot.toml` (or `TAROT_CONFIG_PATH`) and build the router.
pub async fn app() -> anyhow::Result<Router> {
    let cfg = AppConfig::load()?;
    app_with_config(&cfg)
}
