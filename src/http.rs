//! HTTP plumbing shared by the remote providers.
//!
//! # Retry Strategy
//!
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::error::ProviderError;

/// Build a client with the given timeout. `0` means no timeout.
pub fn build_client(timeout_secs: u64) -> Result<Client> {
    let mut builder = Client::builder();
    if timeout_secs > 0 {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }
    Ok(builder.build()?)
}

/// Read an API key from the environment.
pub fn api_key_from_env(var: &str) -> Result<String, ProviderError> {
    match std::env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ProviderError::MissingApiKey {
            var: var.to_string(),
        }),
    }
}

/// Delay before retry number `attempt` (1-based).
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << attempt.saturating_sub(1).min(5))
}

/// Send a request built by `build` up to `max_retries + 1` times and
/// return the parsed JSON body of the first successful response.
pub async fn send_json_with_retry<F>(
    provider: &str,
    max_retries: u32,
    build: F,
) -> Result<Value, ProviderError>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            let delay = backoff_delay(attempt);
            tracing::debug!(provider, attempt, ?delay, "retrying request");
            tokio::time::sleep(delay).await;
        }

        let err = match build().send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return response
                        .json::<Value>()
                        .await
                        .map_err(|e| ProviderError::InvalidResponse {
                            provider: provider.to_string(),
                            reason: e.to_string(),
                        });
                }
                let body = response.text().await.unwrap_or_default();
                ProviderError::Status {
                    provider: provider.to_string(),
                    status,
                    body,
                }
            }
            Err(source) => ProviderError::Transport {
                provider: provider.to_string(),
                source,
            },
        };

        if !err.is_retryable() {
            return Err(err);
        }
        tracing::warn!(provider, attempt, error = %err, "transient provider failure");
        last_err = Some(err);
    }

    Err(last_err.unwrap_or_else(|| ProviderError::InvalidResponse {
        provider: provider.to_string(),
        reason: "no attempts made".to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_sequence() {
        let secs: Vec<u64> = (1..=8).map(|a| backoff_delay(a).as_secs()).collect();
        assert_eq!(secs, vec![1, 2, 4, 8, 16, 32, 32, 32]);
    }

    #[test]
    fn test_missing_api_key() {
        let err = api_key_from_env("TOURBOT_TEST_SURELY_UNSET_KEY").unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_zero_timeout_builds() {
        assert!(build_client(0).is_ok());
        assert!(build_client(5).is_ok());
    }
}
