//! 语音合成：文本清洗、音色选择、凭据轮询，再调用 SpeechSynthesizer

pub mod elevenlabs;
pub mod rotator;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use secrecy::{ExposeSecret, SecretString};

use crate::config::TtsSection;
use crate::core::InterviewError;
use crate::provider::ProviderError;

pub use elevenlabs::ElevenLabsClient;
pub use rotator::KeyRotator;

/// 语音合成能力：文本 + 音色 + 凭据 → 音频字节
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, voice_id: &str, api_key: &str)
        -> Result<Bytes, ProviderError>;
}

/// 音色风格到 voice id 的映射；未知风格使用 male
#[derive(Debug, Clone)]
pub struct VoiceMap {
    pub male: String,
    pub female: String,
}

impl VoiceMap {
    pub fn voice_for(&self, style: &str) -> &str {
        match style {
            "female" => &self.female,
            _ => &self.male,
        }
    }
}

/// 语音服务
pub struct TtsService {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    keys: KeyRotator<SecretString>,
    voices: VoiceMap,
}

impl TtsService {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, keys: Vec<String>, voices: VoiceMap) -> Self {
        Self {
            synthesizer,
            keys: KeyRotator::new(keys.into_iter().map(SecretString::from).collect()),
            voices,
        }
    }

    pub fn from_config(synthesizer: Arc<dyn SpeechSynthesizer>, cfg: &TtsSection) -> Self {
        Self::new(
            synthesizer,
            cfg.keys.clone(),
            VoiceMap {
                male: cfg.voice_male().to_string(),
                female: cfg.voice_female().to_string(),
            },
        )
    }

    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// 合成语音；清洗后为空的文本不发起任何网络调用
    pub async fn speak(&self, text: &str, voice_style: &str) -> Result<Bytes, InterviewError> {
        let text = clean_speech_text(text);
        if text.is_empty() {
            return Err(InterviewError::Validation("No text".to_string()));
        }

        let api_key = self.keys.next_key().ok_or_else(|| {
            ProviderError::NotConfigured("Missing ElevenLabs key".to_string())
        })?;
        let voice_id = self.voices.voice_for(voice_style);

        let audio = self
            .synthesizer
            .synthesize(&text, voice_id, api_key.expose_secret())
            .await?;
        tracing::debug!(voice_id, bytes = audio.len(), "speech synthesized");
        Ok(audio)
    }
}

/// 去非 ASCII、折叠空白（保留 markdown 符号，由调用方决定内容）
fn clean_speech_text(text: &str) -> String {
    let ascii: String = text.chars().filter(char::is_ascii).collect();
    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}
