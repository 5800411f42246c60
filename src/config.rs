//! TOML configuration parsing and validation.
//!
//! Every section has defaults, so an empty file (or [`Config::minimal`])
//! yields a working configuration that stores data under `./data/` and
//! talks to the default hosted providers.
//!
//! ```toml
//! [db]
//! path = "./data/tourbot.sqlite"
//! collection = "concert_tour_collection"
//!
//! [chunking]
//! chunk_size = 1000
//! chunk_overlap = 200
//!
//! [embedding]
//! provider = "local"
//! model = "all-minilm-l6-v2"
//!
//! [llm]
//! base_url = "https://api.groq.com/openai/v1"
//! model = "llama3-8b-8192"
//! api_key_env = "GROQ_API_KEY"
//!
//! [llm.answer]
//! max_tokens = 400
//! temperature = 0.0
//! max_retries = 2
//!
//! [web_search]
//! api_key_env = "SERP_API_KEY"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub web_search: WebSearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            collection: default_collection(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./data/tourbot.sqlite")
}
fn default_collection() -> String {
    "concert_tour_collection".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Neighbours fetched from the persisted document store.
    #[serde(default = "default_k")]
    pub k: usize,
    /// Neighbours fetched from the transient web-search store.
    #[serde(default = "default_web_k")]
    pub web_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: default_k(),
            web_k: default_web_k(),
        }
    }
}

fn default_k() -> usize {
    5
}
fn default_web_k() -> usize {
    8
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL for the Ollama provider.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            url: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}

/// Sampling and retry settings for one LLM call site.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq)]
pub struct CallSiteConfig {
    pub max_tokens: u32,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default)]
    pub max_retries: u32,
}

impl CallSiteConfig {
    pub const fn new(max_tokens: u32, temperature: f32, max_retries: u32) -> Self {
        Self {
            max_tokens,
            temperature,
            max_retries,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible chat completions API.
    #[serde(default = "default_llm_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_llm_key_env")]
    pub api_key_env: String,
    /// Per-request timeout. `0` disables the timeout entirely.
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_classify")]
    pub classify: CallSiteConfig,
    #[serde(default = "default_summarize")]
    pub summarize: CallSiteConfig,
    #[serde(default = "default_answer")]
    pub answer: CallSiteConfig,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base_url(),
            model: default_llm_model(),
            api_key_env: default_llm_key_env(),
            timeout_secs: default_llm_timeout_secs(),
            classify: default_classify(),
            summarize: default_summarize(),
            answer: default_answer(),
        }
    }
}

fn default_llm_base_url() -> String {
    "https://api.groq.com/openai/v1".to_string()
}
fn default_llm_model() -> String {
    "llama3-8b-8192".to_string()
}
fn default_llm_key_env() -> String {
    "GROQ_API_KEY".to_string()
}
fn default_llm_timeout_secs() -> u64 {
    60
}
fn default_classify() -> CallSiteConfig {
    CallSiteConfig::new(10, 0.0, 2)
}
fn default_summarize() -> CallSiteConfig {
    CallSiteConfig::new(500, 0.0, 1)
}
fn default_answer() -> CallSiteConfig {
    CallSiteConfig::new(400, 0.0, 2)
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebSearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_search_engine")]
    pub engine: String,
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,
    /// Interface language hint.
    #[serde(default = "default_hl")]
    pub hl: String,
    /// Country hint.
    #[serde(default = "default_gl")]
    pub gl: String,
    #[serde(default = "default_search_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            engine: default_search_engine(),
            api_key_env: default_search_key_env(),
            hl: default_hl(),
            gl: default_gl(),
            max_retries: default_search_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://serpapi.com/search.json".to_string()
}
fn default_search_engine() -> String {
    "google".to_string()
}
fn default_search_key_env() -> String {
    "SERP_API_KEY".to_string()
}
fn default_hl() -> String {
    "en".to_string()
}
fn default_gl() -> String {
    "us".to_string()
}
fn default_search_retries() -> u32 {
    1
}

impl Config {
    /// All-defaults configuration, used when no config file exists.
    pub fn minimal() -> Self {
        Self::default()
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

/// Load `path` if it exists, otherwise fall back to [`Config::minimal`].
pub fn load_or_default(path: &Path) -> Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config file not found, using defaults");
        Ok(Config::minimal())
    }
}

pub fn validate(config: &Config) -> Result<()> {
    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }
    if config.chunking.chunk_overlap >= config.chunking.chunk_size {
        anyhow::bail!(
            "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
            config.chunking.chunk_overlap,
            config.chunking.chunk_size
        );
    }

    if config.retrieval.k == 0 {
        anyhow::bail!("retrieval.k must be >= 1");
    }
    if config.retrieval.web_k == 0 {
        anyhow::bail!("retrieval.web_k must be >= 1");
    }

    if config.db.collection.trim().is_empty() {
        anyhow::bail!("db.collection must not be empty");
    }

    match config.embedding.provider.as_str() {
        "disabled" | "openai" | "ollama" | "local" => {}
        other => anyhow::bail!(
            "Unknown embedding provider: '{}'. Must be disabled, openai, ollama, or local.",
            other
        ),
    }

    if matches!(config.embedding.provider.as_str(), "openai" | "ollama") {
        if config.embedding.dims.is_none() || config.embedding.dims == Some(0) {
            anyhow::bail!(
                "embedding.dims must be > 0 when provider is '{}'",
                config.embedding.provider
            );
        }
        if config.embedding.model.is_none() {
            anyhow::bail!(
                "embedding.model must be specified when provider is '{}'",
                config.embedding.provider
            );
        }
    }

    for (name, site) in [
        ("classify", &config.llm.classify),
        ("summarize", &config.llm.summarize),
        ("answer", &config.llm.answer),
    ] {
        if site.max_tokens == 0 {
            anyhow::bail!("llm.{}.max_tokens must be > 0", name);
        }
        if !(0.0..=2.0).contains(&site.temperature) {
            anyhow::bail!("llm.{}.temperature must be in [0.0, 2.0]", name);
        }
    }

    Ok(())
}
