//! Anthropic Messages API transport
//!
//! A thin blocking (one request, no retry, no streaming) client around the
//! upstream text-generation endpoint. Error bodies are logged server-side
//! and reduced to status-level messages so upstream detail never reaches a
//! caller-visible error.

use reqwest::Client;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::types::{
    AnthropicConfig, AnthropicError, AnthropicMessage, AnthropicRequest, AnthropicResponse,
    ResponseContentBlock, API_VERSION,
};

/// Client for the upstream Anthropic Messages endpoint
pub struct AnthropicClient {
    client: Client,
    config: AnthropicConfig,
}

impl AnthropicClient {
    /// Create a new client from a configuration
    pub fn new(config: AnthropicConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let config = AnthropicConfig::from_env()?;
        Self::new(config)
    }

    /// Send a single system + user message pair and return the concatenated
    /// text content of the response.
    pub(crate) async fn send(
        &self,
        system: &str,
        user_content: String,
        max_tokens: u32,
    ) -> Result<String> {
        let url = format!("{}/v1/messages", self.config.base_url);

        debug!(model = %self.config.model, "Sending request to upstream model");

        let request = AnthropicRequest {
            model: self.config.model.clone(),
            max_tokens,
            system: system.to_string(),
            messages: vec![AnthropicMessage {
                role: "user",
                content: user_content,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.config.api_key)
            .header("anthropic-version", API_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        if !status.is_success() {
            if status.as_u16() == 429 {
                return Err(Error::RateLimit);
            }
            // Full body stays in the server log only
            if let Ok(parsed) = serde_json::from_str::<AnthropicError>(&body) {
                error!(
                    status = %status,
                    error_type = %parsed.error.r#type,
                    message = %parsed.error.message,
                    "Upstream model call failed"
                );
            } else {
                error!(status = %status, body = %body, "Upstream model call failed");
            }
            return Err(Error::Api(format!("upstream returned HTTP {status}")));
        }

        let parsed: AnthropicResponse =
            serde_json::from_str(&body).map_err(|e| Error::InvalidResponse(e.to_string()))?;

        let text = parsed
            .content
            .iter()
            .filter_map(|block| match block {
                ResponseContentBlock::Text { text } => Some(text.as_str()),
                ResponseContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        if text.is_empty() {
            return Err(Error::InvalidResponse(
                "response contained no text content".to_string(),
            ));
        }

        Ok(text)
    }
}
