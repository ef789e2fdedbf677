//! Anthropic Messages API 客户端（面试对话）
//!
//! - Endpoint: `{base_url}/v1/messages`
//! - 认证头: `x-api-key` + `anthropic-version`
//! - 回复取 `content[0].text`

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::ConversationLlmSection;
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::provider::{ProviderClient, ProviderError};

#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: &'a [Message],
}

#[derive(Deserialize)]
struct AnthropicResponse {
    #[serde(default)]
    content: Vec<AnthropicContent>,
}

#[derive(Deserialize)]
struct AnthropicContent {
    text: Option<String>,
}

/// 对话模型客户端
pub struct AnthropicClient {
    provider: ProviderClient,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    api_version: String,
    max_tokens: u32,
    timeout: Duration,
}

impl AnthropicClient {
    pub fn new(provider: ProviderClient, cfg: &ConversationLlmSection) -> Self {
        Self {
            provider,
            api_key: cfg.api_key.clone().map(SecretString::from),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            api_version: cfg.api_version.clone(),
            max_tokens: cfg.max_tokens,
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }
}

#[async_trait]
impl LlmClient for AnthropicClient {
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::NotConfigured("Claude API key missing".to_string()))?;

        let request = AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system,
            messages,
        };

        let body = self
            .provider
            .post_json_text(
                &self.endpoint(),
                &[
                    ("x-api-key", api_key.expose_secret()),
                    ("anthropic-version", self.api_version.as_str()),
                ],
                &[],
                &request,
                self.timeout,
            )
            .await
            .inspect_err(|e| tracing::error!(model = %self.model, "Claude call failed: {}", e))?;

        extract_text(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn extract_text(body: &str) -> Result<String, ProviderError> {
    let response: AnthropicResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::InvalidBody(e.to_string()))?;
    response
        .content
        .into_iter()
        .next()
        .and_then(|c| c.text)
        .ok_or_else(|| ProviderError::InvalidBody("missing content[0].text".to_string()))
}
