use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::{OracleError, OracleRequest, TextOracle};

/// Configuration for the OpenAI-compatible chat completions backend.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_url: String,
    pub api_key: String,
    /// Transport-level timeout for a single request.
    pub request_timeout: Duration,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            api_key: api_key.into(),
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// Text oracle backed by an OpenAI-compatible chat completions API.
pub struct OpenAiOracle {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiOracle {
    pub fn new(config: OpenAiConfig) -> Self {
        // The timeout is applied per request, so the default client
        // needs no fallible builder step.
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl TextOracle for OpenAiOracle {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &OracleRequest) -> Result<String, OracleError> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(
            model = %request.model,
            prompt_len = request.user_prompt.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .timeout(self.config.request_timeout)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout
                } else {
                    OracleError::ServiceError(e.to_string())
                }
            })?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(OracleError::RateLimited);
        }
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(OracleError::ServiceError(format!(
                "HTTP {status}: {detail}"
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| OracleError::MalformedResponse("empty choices array".to_string()))?;

        Ok(choice.message.content)
    }
}
