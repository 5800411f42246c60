//! Typed failures at the external provider boundaries.
//!
//! Pipeline code propagates these through `anyhow`; callers that need to
//! tell a configuration fault from a request fault can downcast.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    /// A required secret is missing from the environment.
    #[error("{var} environment variable not set")]
    MissingApiKey { var: String },

    /// The provider answered with a non-success HTTP status.
    #[error("{provider} API error {status}: {body}")]
    Status {
        provider: String,
        status: reqwest::StatusCode,
        body: String,
    },

    /// The request never produced a response.
    #[error("{provider} request failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body did not have the expected shape.
    #[error("Invalid {provider} response: {reason}")]
    InvalidResponse { provider: String, reason: String },
}

impl ProviderError {
    /// Whether the failure is worth another attempt (rate limit, server
    /// error, or network failure).
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Status { status, .. } => {
                status.as_u16() == 429 || status.is_server_error()
            }
            ProviderError::Transport { .. } => true,
            ProviderError::MissingApiKey { .. } | ProviderError::InvalidResponse { .. } => false,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, ProviderError::MissingApiKey { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let status = |code: u16| ProviderError::Status {
            provider: "test".to_string(),
            status: reqwest::StatusCode::from_u16(code).unwrap(),
            body: String::new(),
        };
        assert!(status(429).is_retryable());
        assert!(status(503).is_retryable());
        assert!(!status(401).is_retryable());
        assert!(!status(400).is_retryable());
    }

    #[test]
    fn test_missing_key_is_configuration() {
        let err = ProviderError::MissingApiKey {
            var: "GROQ_API_KEY".to_string(),
        };
        assert!(err.is_configuration());
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "GROQ_API_KEY environment variable not set");
    }
}
