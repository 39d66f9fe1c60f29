// src/config.rs
//! Runtime configuration: tuning knobs for discovery, extraction, the
//! acquisition loop, and the completion service.
//!
//! Loaded from a TOML file (default `config/analyzer.toml`, overridable via
//! `ANALYZER_CONFIG_PATH`). Every field has a compiled-in default so the
//! service boots with no file present. The completion API key is never read
//! from the file; it comes from the `GROQ_API_KEY` environment variable.

use std::path::Path;
use std::time::Duration;
use std::{env, fs};

use serde::{Deserialize, Serialize};
use tracing::warn;

pub const DEFAULT_CONFIG_PATH: &str = "config/analyzer.toml";
pub const ENV_CONFIG_PATH: &str = "ANALYZER_CONFIG_PATH";
pub const ENV_API_KEY: &str = "GROQ_API_KEY";

/// Browser-like UA; several publishers return bot-block stubs to default
/// library user agents.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/121.0.0.0 Safari/537.36";

fn default_target_count() -> usize {
    5
}
fn default_request_delay_ms() -> u64 {
    800
}
fn default_max_results() -> usize {
    40
}
fn default_search_endpoint() -> String {
    "https://news.google.com/rss/search".to_string()
}
fn default_min_raw_chars() -> usize {
    2_000
}
fn default_min_text_chars() -> usize {
    300
}
fn default_fetch_timeout_secs() -> u64 {
    20
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_blocked_domains() -> Vec<String> {
    [
        "globeandmail.com",
        "seekingalpha.com",
        "benzinga.com",
        "wsj.com",
        "ft.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
fn default_llm_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}
fn default_llm_model() -> String {
    "openai/gpt-oss-120b".to_string()
}
fn default_eval_temperature() -> f32 {
    0.2
}
fn default_chat_temperature() -> f32 {
    0.3
}
fn default_llm_timeout_secs() -> u64 {
    30
}
fn default_max_article_chars() -> usize {
    3_500
}
fn default_max_eval_context_chars() -> usize {
    2_500
}
fn default_max_transcript_turns() -> usize {
    20
}
fn default_bind_addr() -> String {
    "0.0.0.0:8000".to_string()
}

/// Acquisition loop tuning (success target + politeness throttle).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Stop once this many articles have been extracted.
    #[serde(default = "default_target_count")]
    pub target_count: usize,
    /// Fixed delay after every attempt, successful or not.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            target_count: default_target_count(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

impl AcquisitionConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// RSS search endpoint; the query is appended percent-encoded.
    #[serde(default = "default_search_endpoint")]
    pub search_endpoint: String,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
            search_endpoint: default_search_endpoint(),
        }
    }
}

/// Extractor heuristics. The two length thresholds are empirically tuned
/// cutoffs for "paywall stub / bot-block page", kept configurable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Raw response bodies shorter than this (in chars) are rejected.
    #[serde(default = "default_min_raw_chars")]
    pub min_raw_chars: usize,
    /// Extracted article text must exceed this (in chars) after trimming.
    #[serde(default = "default_min_text_chars")]
    pub min_text_chars: usize,
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Publishers whose pages are known to be uncrawlable (paywalls,
    /// JS-rendered shells). Matched as substrings of the URL host.
    #[serde(default = "default_blocked_domains")]
    pub blocked_domains: Vec<String>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_raw_chars: default_min_raw_chars(),
            min_text_chars: default_min_text_chars(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            user_agent: default_user_agent(),
            blocked_domains: default_blocked_domains(),
        }
    }
}

impl ExtractionConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Low temperatures bias toward deterministic output.
    #[serde(default = "default_eval_temperature")]
    pub eval_temperature: f32,
    #[serde(default = "default_chat_temperature")]
    pub chat_temperature: f32,
    #[serde(default = "default_llm_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Aggregated article text is truncated to this many chars per request.
    #[serde(default = "default_max_article_chars")]
    pub max_article_chars: usize,
    /// Evaluation context forwarded to follow-up chat is capped here.
    #[serde(default = "default_max_eval_context_chars")]
    pub max_eval_context_chars: usize,
    /// At most this many trailing transcript turns are sent as context.
    #[serde(default = "default_max_transcript_turns")]
    pub max_transcript_turns: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            model: default_llm_model(),
            eval_temperature: default_eval_temperature(),
            chat_temperature: default_chat_temperature(),
            request_timeout_secs: default_llm_timeout_secs(),
            max_article_chars: default_max_article_chars(),
            max_eval_context_chars: default_max_eval_context_chars(),
            max_transcript_turns: default_max_transcript_turns(),
        }
    }
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Read the completion-service key from the environment. `None` disables
    /// evaluation and chat; price and snapshot features keep working.
    pub fn resolve_api_key() -> Option<String> {
        env::var(ENV_API_KEY).ok().filter(|k| !k.trim().is_empty())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl AnalyzerConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let data = fs::read_to_string(path)?;
        let cfg: AnalyzerConfig = toml::from_str(&data)?;
        Ok(cfg)
    }

    /// Load from `ANALYZER_CONFIG_PATH` or the default path; any read/parse
    /// problem falls back to defaults with a warning.
    pub fn load_or_default() -> Self {
        let path =
            env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match Self::from_path(&path) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(%path, error = %e, "config not loaded, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_tuned_constants() {
        let cfg = AnalyzerConfig::default();
        assert_eq!(cfg.acquisition.target_count, 5);
        assert_eq!(cfg.acquisition.request_delay_ms, 800);
        assert_eq!(cfg.discovery.max_results, 40);
        assert_eq!(cfg.extraction.min_raw_chars, 2_000);
        assert_eq!(cfg.extraction.min_text_chars, 300);
        assert_eq!(cfg.extraction.fetch_timeout_secs, 20);
        assert_eq!(cfg.extraction.blocked_domains.len(), 5);
        assert_eq!(cfg.llm.request_timeout_secs, 30);
        assert_eq!(cfg.llm.max_transcript_turns, 20);
        assert_eq!(cfg.llm.max_eval_context_chars, 2_500);
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: AnalyzerConfig = toml::from_str(
            r#"
            [acquisition]
            target_count = 3

            [extraction]
            min_text_chars = 450
            "#,
        )
        .expect("parse partial config");
        assert_eq!(cfg.acquisition.target_count, 3);
        assert_eq!(cfg.acquisition.request_delay_ms, 800);
        assert_eq!(cfg.extraction.min_text_chars, 450);
        assert_eq!(cfg.extraction.min_raw_chars, 2_000);
        assert_eq!(cfg.discovery.max_results, 40);
    }

    #[test]
    fn eval_and_chat_temperatures_differ() {
        let cfg = LlmConfig::default();
        assert!((cfg.eval_temperature - 0.2).abs() < 1e-6);
        assert!((cfg.chat_temperature - 0.3).abs() < 1e-6);
    }
}
