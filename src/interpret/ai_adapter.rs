//! Generative-text narration: provider abstraction + file cache + daily limit.
//!
//! Every failure path (disabled, over the limit, network error, empty answer)
//! yields `None`; the caller falls back to the template.

use std::fs;
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::config::InterpreterConfig;

/// Longest narrative kept after sanitizing.
pub const MAX_NARRATIVE_CHARS: usize = 600;

/// Narrative returned by a provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Narrative {
    pub text: String,
}

/// Trait object used by the interpreter and tests.
pub trait NarrativeClient: Send + Sync {
    /// Narrate a reading prompt; `None` means "use the template".
    fn narrate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<Narrative>> + Send + 'a>>;
    fn provider_name(&self) -> &'static str;
}

pub type DynNarrativeClient = Arc<dyn NarrativeClient>;

/// Build a client from config and environment.
///
/// * `AI_TEST_MODE=mock` → deterministic mock behind the cache.
/// * `enabled = false` → [`DisabledClient`].
/// * `provider = "openai"` → OpenAI behind the cache and daily limit.
pub fn build_client_from_config(config: &InterpreterConfig) -> anyhow::Result<DynNarrativeClient> {
    if std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false)
    {
        let mock = MockProvider::new("The cards lean toward steady progress (mock).");
        let client = CachingClient::new(mock, config.cache_dir.clone(), config.daily_limit);
        return Ok(Arc::new(client));
    }

    if !config.enabled {
        return Ok(Arc::new(DisabledClient));
    }

    match config.provider.as_str() {
        "openai" => {
            let provider = OpenAiProvider::new(&config.model, config.api_key.clone())?;
            Ok(Arc::new(CachingClient::new(
                provider,
                config.cache_dir.clone(),
                config.daily_limit,
            )))
        }
        "mock" => {
            let mock = MockProvider::new("The cards lean toward steady progress (mock).");
            Ok(Arc::new(CachingClient::new(
                mock,
                config.cache_dir.clone(),
                config.daily_limit,
            )))
        }
        other => {
            warn!(provider = %other, "unknown interpreter provider; narration disabled");
            Ok(Arc::new(DisabledClient))
        }
    }
}

// ------------------------------------------------------------
// Providers
// ------------------------------------------------------------

/// Low-level provider doing the actual remote call.
pub trait Provider: Send + Sync + 'static {
    fn fetch<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<Narrative>> + Send + 'a>>;
    fn name(&self) -> &'static str;
}

/// OpenAI Chat Completions.
pub struct OpenAiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiProvider {
    pub fn new(model: &str, api_key: String) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("tarot-eigenvalue/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(15))
            .build()?;
        Ok(Self {
            http,
            api_key,
            model: model.to_string(),
        })
    }
}

impl Provider for OpenAiProvider {
    fn fetch<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<Narrative>> + Send + 'a>> {
        Box::pin(async move {
            if self.api_key.is_empty() {
                return None;
            }

            #[derive(Serialize)]
            struct Msg<'a> {
                role: &'a str,
                content: &'a str,
            }
            #[derive(Serialize)]
            struct Req<'a> {
                model: &'a str,
                messages: Vec<Msg<'a>>,
                temperature: f32,
                max_tokens: u32,
            }
            #[derive(Deserialize)]
            struct Resp {
                choices: Vec<Choice>,
            }
            #[derive(Deserialize)]
            struct Choice {
                message: ChoiceMsg,
            }
            #[derive(Deserialize)]
            struct ChoiceMsg {
                content: String,
            }

            let sys = "You are a tarot reader. Given the cards, their positions and the \
                       reading energy, write one short paragraph (at most 600 ASCII \
                       characters), warm but grounded, no emojis.";
            let req = Req {
                model: &self.model,
                messages: vec![
                    Msg {
                        role: "system",
                        content: sys,
                    },
                    Msg {
                        role: "user",
                        content: prompt,
                    },
                ],
                temperature: 0.7,
                max_tokens: 220,
            };

            let resp = match self
                .http
                .post("https://api.openai.com/v1/chat/completions")
                .bearer_auth(&self.api_key)
                .json(&req)
                .send()
                .await
            {
                Ok(r) => r,
                Err(e) => {
                    warn!(error = %e, "openai request failed");
                    return None;
                }
            };

            if !resp.status().is_success() {
                warn!(status = %resp.status(), "openai returned an error status");
                return None;
            }
            let body: Resp = resp.json().await.ok()?;
            let content = body
                .choices
                .first()
                .map(|c| c.message.content.as_str())
                .unwrap_or("");
            let cleaned = sanitize_narrative(content);
            if cleaned.is_empty() {
                None
            } else {
                Some(Narrative { text: cleaned })
            }
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

/// Always `None`.
pub struct DisabledClient;

impl NarrativeClient for DisabledClient {
    fn narrate<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<Narrative>> + Send + 'a>> {
        Box::pin(async { None })
    }
    fn provider_name(&self) -> &'static str {
        "disabled"
    }
}

/// Fixed answer for tests and local runs.
#[derive(Clone)]
pub struct MockProvider {
    pub fixed: Narrative,
}

impl MockProvider {
    pub fn new(text: &str) -> Self {
        Self {
            fixed: Narrative {
                text: text.to_string(),
            },
        }
    }
}

impl Provider for MockProvider {
    fn fetch<'a>(
        &'a self,
        _prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<Narrative>> + Send + 'a>> {
        let out = self.fixed.clone();
        Box::pin(async move { Some(out) })
    }
    fn name(&self) -> &'static str {
        "mock"
    }
}

// ------------------------------------------------------------
// Caching wrapper (file cache + daily limit)
// ------------------------------------------------------------

pub struct CachingClient<P: Provider> {
    inner: P,
    cache_dir: PathBuf,
    daily_limit_max: u32,
    counter: Mutex<DailyCounter>,
}

impl<P: Provider> CachingClient<P> {
    pub fn new(inner: P, cache_dir: PathBuf, daily_limit_max: u32) -> Self {
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!(dir = %cache_dir.display(), error = %e, "cannot create narrative cache dir");
        }
        let counter = Mutex::new(load_daily_counter(&cache_dir).unwrap_or_default());
        Self {
            inner,
            cache_dir,
            daily_limit_max,
            counter,
        }
    }

    /// Real calls made today.
    pub fn calls_today(&self) -> u32 {
        let g = self.counter.lock().expect("poisoned counter");
        if g.is_expired() {
            0
        } else {
            g.count
        }
    }

    async fn narrate_impl(&self, prompt: &str) -> Option<Narrative> {
        let key = cache_key(prompt);
        if let Some(hit) = read_cache_file(&self.cache_dir, &key) {
            debug!(key = %key, "narrative cache hit");
            return Some(hit);
        }

        // Only real calls count against the limit. The slot is reserved before the
        // call so concurrent requests cannot overshoot it.
        let reserved_on = {
            let mut g = self.counter.lock().expect("poisoned counter");
            if g.is_expired() {
                g.reset_to_today();
            }
            if g.count >= self.daily_limit_max {
                debug!(limit = self.daily_limit_max, "daily narrative limit reached");
                return None;
            }
            g.count += 1;
            let _ = save_daily_counter(&self.cache_dir, &g);
            g.date.clone()
        };

        let fresh = self
            .inner
            .fetch(prompt)
            .await
            .map(|n| Narrative {
                text: sanitize_narrative(&n.text),
            })
            .filter(|n| !n.text.is_empty());

        let Some(fresh) = fresh else {
            self.release(&reserved_on);
            return None;
        };
        if let Err(e) = write_cache_file(&self.cache_dir, &key, &fresh) {
            debug!(error = %e, "narrative cache write failed");
        }
        Some(fresh)
    }

    /// Give back a reserved slot whose call produced nothing.
    fn release(&self, reserved_on: &str) {
        let mut g = self.counter.lock().expect("poisoned counter");
        if g.date == reserved_on {
            g.count = g.count.saturating_sub(1);
            let _ = save_daily_counter(&self.cache_dir, &g);
        }
    }
}

impl<P: Provider> NarrativeClient for CachingClient<P> {
    fn narrate<'a>(
        &'a self,
        prompt: &'a str,
    ) -> Pin<Box<dyn Future<Output = Option<Narrative>> + Send + 'a>> {
        Box::pin(self.narrate_impl(prompt))
    }
    fn provider_name(&self) -> &'static str {
        self.inner.name()
    }
}

// ------------------------------------------------------------
// File cache helpers
// ------------------------------------------------------------

fn cache_key(prompt: &str) -> String {
    let digest = Sha256::digest(prompt.as_bytes());
    digest[..12].iter().map(|b| format!("{b:02x}")).collect()
}

fn cache_path(dir: &Path, key: &str) -> PathBuf {
    dir.join(format!("{key}.json"))
}

fn read_cache_file(dir: &Path, key: &str) -> Option<Narrative> {
    let buf = fs::read_to_string(cache_path(dir, key)).ok()?;
    serde_json::from_str(&buf).ok()
}

fn write_atomic(path: &Path, json: &str) -> io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    let mut f = fs::File::create(&tmp)?;
    f.write_all(json.as_bytes())?;
    fs::rename(tmp, path)
}

fn write_cache_file(dir: &Path, key: &str, value: &Narrative) -> io::Result<()> {
    let json = serde_json::to_string(value).map_err(io::Error::other)?;
    write_atomic(&cache_path(dir, key), &json)
}

// ------------------------------------------------------------
// Daily counter
// ------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DailyCounter {
    date: String,
    count: u32,
}

impl Default for DailyCounter {
    fn default() -> Self {
        Self {
            date: today(),
            count: 0,
        }
    }
}

impl DailyCounter {
    fn is_expired(&self) -> bool {
        self.date != today()
    }
    fn reset_to_today(&mut self) {
        self.date = today();
        self.count = 0;
    }
}

fn today() -> String {
    chrono::Utc::now().date_naive().to_string()
}

fn counter_path(dir: &Path) -> PathBuf {
    dir.join("daily_count.json")
}

fn load_daily_counter(dir: &Path) -> io::Result<DailyCounter> {
    let s = fs::read_to_string(counter_path(dir))?;
    serde_json::from_str(&s).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn save_daily_counter(dir: &Path, dc: &DailyCounter) -> io::Result<()> {
    let json = serde_json::to_string(dc).map_err(io::Error::other)?;
    write_atomic(&counter_path(dir), &json)
}

// ------------------------------------------------------------
// Sanitization
// ------------------------------------------------------------

/// ASCII only, one paragraph, collapsed whitespace, at most [`MAX_NARRATIVE_CHARS`].
pub fn sanitize_narrative(input: &str) -> String {
    let mut out = String::with_capacity(MAX_NARRATIVE_CHARS);
    let mut prev_space = false;
    for ch in input.chars() {
        let c = if ch.is_ascii() && !ch.is_ascii_control() {
            ch
        } else {
            ' '
        };
        if c == ' ' {
            if !prev_space && !out.is_empty() {
                out.push(' ');
            }
            prev_space = true;
        } else {
            out.push(c);
            prev_space = false;
        }
        if out.len() >= MAX_NARRATIVE_CHARS {
            break;
        }
    }
    out.trim().to_string()
}
