//! LLM 客户端抽象
//!
//! 对话模型（Anthropic）、评估模型（Gemini）、Mock 都实现 LlmClient：给定 system 指令与消息序列，返回模型原始文本。

use async_trait::async_trait;

use crate::memory::Message;
use crate::provider::ProviderError;

/// LLM 客户端 trait：单次非流式完成
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// 非流式完成，返回模型回复的原始文本（未解析）
    async fn complete(&self, system: &str, messages: &[Message]) -> Result<String, ProviderError>;

    /// 模型名（用于日志与状态接口）
    fn model(&self) -> &str;
}
