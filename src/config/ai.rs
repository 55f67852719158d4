// src/config/ai.rs
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf};

pub const DEFAULT_DAILY_LIMIT: u32 = 20;

fn default_provider() -> String {
    "openai".to_string()
}
fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_daily_limit() -> u32 {
    DEFAULT_DAILY_LIMIT
}
fn default_api_key() -> String {
    "ENV".to_string()
}
fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache/ai")
}

/// `[interpreter]` section of `config/tarot.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpreterConfig {
    #[serde(default)]
    pub enabled: bool,
    /// "openai" | "mock" (case-insensitive)
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,
    /// "ENV" means: read from OPENAI_API_KEY
    #[serde(default = "default_api_key", skip_serializing)]
    pub api_key: String,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: default_provider(),
            model: default_model(),
            daily_limit: default_daily_limit(),
            api_key: default_api_key(),
            cache_dir: default_cache_dir(),
        }
    }
}

impl InterpreterConfig {
    /// Normalize the provider and resolve an `ENV` api key.
    ///
    /// A missing key is only an error when the OpenAI provider is enabled.
    pub fn resolve(mut self) -> anyhow::Result<Self> {
        self.provider = self.provider.trim().to_lowercase();
        if self.model.trim().is_empty() {
            self.model = default_model();
        }

        if self.api_key.trim().eq_ignore_ascii_case("env") {
            self.api_key = match env::var("OPENAI_API_KEY") {
                Ok(k) => k,
                Err(_) if self.enabled && self.provider == "openai" => {
                    anyhow::bail!("Missing OPENAI_API_KEY env var")
                }
                Err(_) => String::new(),
            };
        }

        Ok(self)
    }
}
