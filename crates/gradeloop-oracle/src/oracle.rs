use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur at the text oracle boundary.
///
/// Transient errors (`RateLimited`, `Timeout`) are safe to retry;
/// terminal errors propagate immediately.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("Rate limited by the completion service")]
    RateLimited,

    #[error("Completion request timed out")]
    Timeout,

    #[error("Malformed completion response: {0}")]
    MalformedResponse(String),

    #[error("Completion service error: {0}")]
    ServiceError(String),
}

impl OracleError {
    /// Whether the error class is worth retrying with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(self, OracleError::RateLimited | OracleError::Timeout)
    }
}

/// A single completion request.
#[derive(Debug, Clone)]
pub struct OracleRequest {
    pub model: String,
    pub system_prompt: String,
    pub user_prompt: String,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl OracleRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            model: "gpt-4".to_string(),
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            temperature: 0.7,
            max_tokens: 2500,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// The core abstraction over a generative text service.
///
/// A pure boundary adapter: one prompt in, one completion out. Retry
/// policy lives in [`crate::RetryPolicy`], not in implementations.
#[async_trait]
pub trait TextOracle: Send + Sync {
    /// Human-readable name of the backing service (for logs).
    fn name(&self) -> &str;

    /// Send a prompt and return the completion text.
    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(OracleError::RateLimited.is_transient());
        assert!(OracleError::Timeout.is_transient());
        assert!(!OracleError::MalformedResponse("bad json".into()).is_transient());
        assert!(!OracleError::ServiceError("500".into()).is_transient());
    }

    #[test]
    fn request_builder_defaults() {
        let req = OracleRequest::new("system", "user")
            .with_temperature(0.0)
            .with_max_tokens(100);
        assert_eq!(req.model, "gpt-4");
        assert_eq!(req.temperature, 0.0);
        assert_eq!(req.max_tokens, 100);
    }
}
