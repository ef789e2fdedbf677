//! 记忆层：面试对话历史

pub mod conversation;

pub use conversation::{ConversationHistory, Message, Role, TRANSCRIPT_MAX_CHARS};
