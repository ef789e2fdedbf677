//! ElevenLabs 语音合成客户端
//!
//! `POST {base_url}/v1/text-to-speech/{voice_id}/stream`，认证头 `xi-api-key`，返回 audio/mpeg 字节。

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

use super::SpeechSynthesizer;
use crate::config::TtsSection;
use crate::provider::{ProviderClient, ProviderError};

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Serialize, Clone, Copy)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

pub struct ElevenLabsClient {
    provider: ProviderClient,
    base_url: String,
    model_id: String,
    voice_settings: VoiceSettings,
    timeout: Duration,
}

impl ElevenLabsClient {
    pub fn new(provider: ProviderClient, cfg: &TtsSection) -> Self {
        Self {
            provider,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            model_id: cfg.model_id.clone(),
            voice_settings: VoiceSettings {
                stability: cfg.stability,
                similarity_boost: cfg.similarity_boost,
            },
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }

    fn endpoint(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}/stream", self.base_url, voice_id)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(
        &self,
        text: &str,
        voice_id: &str,
        api_key: &str,
    ) -> Result<Bytes, ProviderError> {
        let request = SpeechRequest {
            text,
            model_id: &self.model_id,
            voice_settings: self.voice_settings,
        };
        self.provider
            .post_json(
                &self.endpoint(voice_id),
                &[("xi-api-key", api_key)],
                &[],
                &request,
                self.timeout,
            )
            .await
            .inspect_err(|e| tracing::error!(voice_id, "TTS failed: {}", e))
    }
}
