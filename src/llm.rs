//! Chat completion provider abstraction.
//!
//! The pipeline talks to the language model through [`CompletionProvider`].
//! The shipped implementation, [`ChatCompletionsProvider`], speaks the
//! OpenAI-compatible `POST {base_url}/chat/completions` protocol, which Groq,
//! OpenAI, and most self-hosted gateways accept.
//!
//! Every request carries its own token budget, temperature, and retry count
//! so that each call site can be tuned independently in `[llm.*]` config
//! tables.

use anyhow::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{CallSiteConfig, LlmConfig};
use crate::error::ProviderError;
use crate::http;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// One chat completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Extra attempts after the first on transient failures.
    pub max_retries: u32,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>, site: &CallSiteConfig) -> Self {
        Self {
            messages,
            max_tokens: site.max_tokens,
            temperature: site.temperature,
            max_retries: site.max_retries,
        }
    }
}

/// A completion as returned by the provider.
#[derive(Debug, Clone)]
pub struct Completion {
    /// The assistant message content, when the response had one.
    pub content: Option<String>,
    /// The full response body.
    pub raw: Value,
}

impl Completion {
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            raw: Value::String(text.clone()),
            content: Some(text),
        }
    }

    /// The completion text, or the raw response rendered as a string when
    /// the expected content field was missing.
    pub fn text(&self) -> String {
        match &self.content {
            Some(content) => content.clone(),
            None => match &self.raw {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        }
    }
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion>;
}

/// OpenAI-compatible chat completions client.
pub struct ChatCompletionsProvider {
    endpoint: String,
    model: String,
    api_key: String,
    client: Client,
}

impl ChatCompletionsProvider {
    /// # Errors
    ///
    /// Fails when the environment variable named by `llm.api_key_env` is
    /// unset or empty.
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_key = http::api_key_from_env(&config.api_key_env)?;
        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            model: config.model.clone(),
            api_key,
            client: http::build_client(config.timeout_secs)?,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    messages: &'a [ChatMessage],
}

#[async_trait]
impl CompletionProvider for ChatCompletionsProvider {
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion> {
        let body = ChatRequest {
            model: &self.model,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            messages: &request.messages,
        };

        let raw = http::send_json_with_retry("LLM", request.max_retries, || {
            self.client
                .post(&self.endpoint)
                .bearer_auth(&self.api_key)
                .json(&body)
        })
        .await?;

        if let Some(err) = raw.get("error") {
            return Err(ProviderError::InvalidResponse {
                provider: "LLM".to_string(),
                reason: err.to_string(),
            }
            .into());
        }

        Ok(Completion {
            content: extract_content(&raw),
            raw,
        })
    }
}

/// `choices[0].message.content`, if present and a string.
fn extract_content(raw: &Value) -> Option<String> {
    raw.get("choices")?
        .as_array()?
        .first()?
        .get("message")?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_content() {
        let raw = serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": "document" } }]
        });
        assert_eq!(extract_content(&raw).as_deref(), Some("document"));
    }

    #[test]
    fn test_text_falls_back_to_raw() {
        let raw = serde_json::json!({ "choices": [] });
        let completion = Completion {
            content: extract_content(&raw),
            raw,
        };
        assert_eq!(completion.text(), r#"{"choices":[]}"#);
    }

    #[test]
    fn test_request_uses_call_site_budget() {
        let site = CallSiteConfig::new(400, 0.0, 2);
        let req = CompletionRequest::new(vec![ChatMessage::user("hi")], &site);
        assert_eq!(req.max_tokens, 400);
        assert_eq!(req.max_retries, 2);
        assert_eq!(req.messages[0].role, "user");
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("s"), ChatMessage::user("u")];
        let body = ChatRequest {
            model: "llama3-8b-8192",
            temperature: 0.0,
            max_tokens: 10,
            messages: &messages,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["model"], "llama3-8b-8192");
        assert_eq!(json["max_tokens"], 10);
        assert_eq!(json["messages"][1]["content"], "u");
    }
}
