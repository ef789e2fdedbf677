//! LLM 层：客户端抽象与实现（Anthropic 对话 / Gemini 评估 / Mock）

pub mod anthropic;
pub mod gemini;
pub mod mock;
pub mod traits;

pub use anthropic::AnthropicClient;
pub use gemini::GeminiClient;
pub use mock::{MockLlmClient, RecordedCall};
pub use traits::LlmClient;
