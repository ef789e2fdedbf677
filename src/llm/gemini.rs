//! Google Gemini generateContent 客户端（面试评估）
//!
//! system 指令与各条消息依次作为同一个 content 的 parts 发送；回复拼接所有 text part。

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::config::EvaluationLlmSection;
use crate::llm::LlmClient;
use crate::memory::Message;
use crate::provider::{ProviderClient, ProviderError};

#[derive(Serialize)]
struct GeminiRequest<'a> {
    contents: Vec<GeminiContent<'a>>,
}

#[derive(Serialize)]
struct GeminiContent<'a> {
    parts: Vec<GeminiPart<'a>>,
}

#[derive(Serialize)]
struct GeminiPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContentResponse,
}

#[derive(Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Vec<GeminiPartResponse>,
}

#[derive(Deserialize)]
struct GeminiPartResponse {
    text: Option<String>,
}

/// 评估模型客户端
pub struct GeminiClient {
    provider: ProviderClient,
    api_key: Option<SecretString>,
    base_url: String,
    model: String,
    timeout: Duration,
}

impl GeminiClient {
    pub fn new(provider: ProviderClient, cfg: &EvaluationLlmSection) -> Self {
        Self {
            provider,
            api_key: cfg.api_key.clone().map(SecretString::from),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model: cfg.model.clone(),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }
}

fn build_request<'a>(system: &'a str, messages: &'a [Message]) -> GeminiRequest<'a> {
    let parts = std::iter::once(GeminiPart { text: system })
        .chain(messages.iter().map(|m| GeminiPart { text: &m.content }))
        .collect();
    GeminiRequest {
        contents: vec![GeminiContent { parts }],
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<String, ProviderError> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or_else(|| ProviderError::NotConfigured("Gemini API key missing".to_string()))?;

        let body = self
            .provider
            .post_json_text(
                &self.endpoint(),
                &[],
                &[("key", api_key.expose_secret())],
                &build_request(system, messages),
                self.timeout,
            )
            .await
            .inspect_err(|e| tracing::error!(model = %self.model, "Gemini call failed: {}", e))?;

        extract_text(&body)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

fn extract_text(body: &str) -> Result<String, ProviderError> {
    let response: GeminiResponse =
        serde_json::from_str(body).map_err(|e| ProviderError::InvalidBody(e.to_string()))?;
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::InvalidBody("missing candidates[0]".to_string()))?;
    Ok(candidate
        .content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect())
}
