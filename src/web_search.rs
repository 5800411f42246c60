//! Web search provider abstraction.
//!
//! [`SerpApiProvider`] queries the SerpApi Google engine and returns its
//! `organic_results` in rank order. Only the snippet is used downstream;
//! title and link are logged at debug level.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::config::WebSearchConfig;
use crate::error::ProviderError;
use crate::http;

/// A search request with its locale hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub q: String,
    pub hl: String,
    pub gl: String,
}

impl SearchQuery {
    /// The upcoming-concerts query for `artist`.
    pub fn upcoming_concerts(artist: &str, config: &WebSearchConfig) -> Self {
        Self {
            q: format!("{} upcoming concerts", artist),
            hl: config.hl.clone(),
            gl: config.gl.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchHit {
    pub title: Option<String>,
    pub link: Option<String>,
    pub snippet: Option<String>,
}

#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Ordered organic results; empty when the engine found nothing.
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>>;
}

pub struct SerpApiProvider {
    endpoint: String,
    engine: String,
    api_key: String,
    max_retries: u32,
    client: Client,
}

impl SerpApiProvider {
    pub fn new(config: &WebSearchConfig) -> Result<Self> {
        let api_key = http::api_key_from_env(&config.api_key_env)?;
        Ok(Self {
            endpoint: config.endpoint.clone(),
            engine: config.engine.clone(),
            api_key,
            max_retries: config.max_retries,
            client: http::build_client(config.timeout_secs)?,
        })
    }
}

#[derive(Deserialize)]
struct SerpResponse {
    #[serde(default)]
    organic_results: Vec<SearchHit>,
    error: Option<String>,
}

#[async_trait]
impl WebSearchProvider for SerpApiProvider {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchHit>> {
        let url = Url::parse_with_params(
            &self.endpoint,
            &[
                ("q", query.q.as_str()),
                ("engine", self.engine.as_str()),
                ("hl", query.hl.as_str()),
                ("gl", query.gl.as_str()),
                ("api_key", self.api_key.as_str()),
            ],
        )?;

        let json = http::send_json_with_retry("SerpApi", self.max_retries, || {
            self.client.get(url.clone())
        })
        .await?;
        Ok(parse_serp_response(json)?)
    }
}

fn parse_serp_response(json: serde_json::Value) -> Result<Vec<SearchHit>, ProviderError> {
    let parsed: SerpResponse =
        serde_json::from_value(json).map_err(|e| ProviderError::InvalidResponse {
            provider: "SerpApi".to_string(),
            reason: e.to_string(),
        })?;

    // SerpApi reports "no results" as an error string with a 200 status.
    if let Some(error) = parsed.error {
        if parsed.organic_results.is_empty() && !error.contains("hasn't returned any results") {
            return Err(ProviderError::InvalidResponse {
                provider: "SerpApi".to_string(),
                reason: error,
            });
        }
    }

    Ok(parsed.organic_results)
}

/// Snippets of `hits` in rank order, skipping hits without one.
pub fn snippets(hits: &[SearchHit]) -> Vec<String> {
    hits.iter()
        .filter_map(|hit| hit.snippet.as_deref())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
