//! OpenAI-compatible chat completions client
//!
//! This module implements the LlmClient trait against any endpoint that
//! speaks the OpenAI chat-completions protocol with function calling.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{HearthError, Result};
use crate::llm::client::LlmClient;
use crate::llm::types::{CompletionRequest, Message};

/// Default chat completions endpoint
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Environment variable holding the API key
const DEFAULT_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Configuration for the OpenAI-compatible client
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key_env: String,
    pub timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

impl OpenAiConfig {
    /// Create a config pointing at a custom endpoint
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }
}

/// OpenAI-compatible API client
pub struct OpenAiClient {
    client: Client,
    api_key: String,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new client, reading the API key from the configured env var
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env)
            .map_err(|_| HearthError::Llm(format!("{} not set", config.api_key_env)))?;

        Self::with_api_key(api_key, config)
    }

    /// Create a client with an explicit API key
    pub fn with_api_key(api_key: String, config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| HearthError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Extract the assistant message from a chat-completions response body
    fn parse_response(&self, body: Value) -> Result<Message> {
        let message = body
            .get("choices")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("message"))
            .cloned()
            .ok_or_else(|| {
                HearthError::Llm(format!("Response missing choices[0].message: {}", body))
            })?;

        serde_json::from_value(message)
            .map_err(|e| HearthError::Llm(format!("Failed to decode assistant message: {}", e)))
    }

    /// Send a request body and return the parsed JSON response
    async fn send_request(&self, request: &CompletionRequest) -> Result<Value> {
        let response = self
            .client
            .post(&self.config.base_url)
            .bearer_auth(&self.api_key)
            .header("content-type", "application/json")
            .json(request)
            .send()
            .await
            .map_err(|e| HearthError::Llm(format!("Request failed: {}", e)))?;

        let status = response.status();

        // Handle rate limiting
        if status.as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(HearthError::Llm(format!(
                "Rate limited, retry after {} seconds",
                retry_after
            )));
        }

        // Handle other errors
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(HearthError::Llm(format!(
                "API error {}: {}",
                status, error_body
            )));
        }

        response
            .json()
            .await
            .map_err(|e| HearthError::Llm(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Message> {
        log::debug!(
            "Completion request: model={}, messages={}, tools={}",
            request.model,
            request.messages.len(),
            request.tools.len()
        );
        let body = self.send_request(&request).await?;
        self.parse_response(body)
    }
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient")
            .field("base_url", &self.config.base_url)
            .finish()
    }
}
