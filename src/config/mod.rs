//! Application configuration (`config/tarot.toml`).
//!
//! Path resolution: `TAROT_CONFIG_PATH` → `config/tarot.toml` → built-in defaults.
//! `TAROT_DEFAULT_STRATEGY` and `TAROT_JOURNAL_CAPACITY` override the file.

pub mod ai;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};
use tracing::{info, warn};

use crate::eigen::ScoringStrategy;
use crate::journal::MAX_JOURNAL_CAPACITY;
pub use ai::InterpreterConfig;

pub const DEFAULT_CONFIG_PATH: &str = "config/tarot.toml";
pub const ENV_CONFIG_PATH: &str = "TAROT_CONFIG_PATH";
pub const ENV_DEFAULT_STRATEGY: &str = "TAROT_DEFAULT_STRATEGY";
pub const ENV_JOURNAL_CAPACITY: &str = "TAROT_JOURNAL_CAPACITY";

pub const DEFAULT_JOURNAL_CAPACITY: usize = 2000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// `manual` or `use_case`; AI-assisted scoring is chosen per request.
    #[serde(default = "default_strategy_name")]
    pub default_strategy: String,
}

fn default_strategy_name() -> String {
    "manual".to_string()
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            default_strategy: default_strategy_name(),
        }
    }
}

impl ScoringConfig {
    pub fn strategy(&self) -> ScoringStrategy {
        self.default_strategy.parse().unwrap_or_else(|e| {
            warn!(error = %e, "invalid default strategy; using manual");
            ScoringStrategy::Manual
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
}

fn default_capacity() -> usize {
    DEFAULT_JOURNAL_CAPACITY
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Card detector wiring. Without a fixture, photo readings are refused.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// JSON detection batch replayed for every photo (local runs).
    #[serde(default)]
    pub fixture_path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub interpreter: InterpreterConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
}

impl AppConfig {
    /// Resolve the path, read it if present, then apply env overrides.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        let cfg = if path.exists() {
            Self::load_from_file(&path)?
        } else {
            info!(path = %path.display(), "config file not found; using defaults");
            Self::default()
        };
        cfg.finish()
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config at {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Env overrides, capacity bound and api key resolution.
    pub fn finish(mut self) -> anyhow::Result<Self> {
        if let Ok(s) = std::env::var(ENV_DEFAULT_STRATEGY) {
            match s.parse::<ScoringStrategy>() {
                Ok(st) => self.scoring.default_strategy = st.name().to_string(),
                Err(e) => warn!(error = %e, "ignoring {ENV_DEFAULT_STRATEGY}"),
            }
        }
        if let Some(cap) = parse_capacity_env(std::env::var(ENV_JOURNAL_CAPACITY).ok()) {
            self.journal.capacity = cap;
        }
        if self.journal.capacity == 0 || self.journal.capacity > MAX_JOURNAL_CAPACITY {
            warn!(
                capacity = self.journal.capacity,
                "journal capacity out of range; clamping"
            );
            self.journal.capacity = self.journal.capacity.clamp(1, MAX_JOURNAL_CAPACITY);
        }
        self.interpreter = self.interpreter.resolve()?;
        Ok(self)
    }
}

fn parse_capacity_env(v: Option<String>) -> Option<usize> {
    v.and_then(|s| s.trim().parse::<usize>().ok())
}
