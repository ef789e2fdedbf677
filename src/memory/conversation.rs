//! 面试对话历史
//!
//! 只追加、按时间排序；每一轮都会把完整历史重新发送给对话模型，评估时渲染为文字稿。

use serde::{Deserialize, Serialize};

/// 单条消息内容在文字稿中保留的最大字符数
pub const TRANSCRIPT_MAX_CHARS: usize = 500;

const TRUNCATED_MARKER: &str = "...(truncated)";

/// 消息角色（与 LLM API 一致）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// 单条消息
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// 对话历史：不剪枝，会话存活期间完整保留
#[derive(Clone, Debug, Default)]
pub struct ConversationHistory {
    messages: Vec<Message>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, msg: Message) {
        self.messages.push(msg);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// 渲染为 `ROLE: content` 文字稿，逐行排列；超长内容截断并追加标记
    pub fn render_transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| {
                format!(
                    "{}: {}",
                    m.role.as_str().to_uppercase(),
                    truncate_chars(&m.content, TRANSCRIPT_MAX_CHARS)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn truncate_chars(content: &str, max: usize) -> String {
    match content.char_indices().nth(max) {
        Some((idx, _)) => format!("{}{}", &content[..idx], TRUNCATED_MARKER),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn test_transcript_format() {
        let mut history = ConversationHistory::new();
        history.push(Message::user("Start"));
        history.push(Message::assistant("Hello there"));
        assert_eq!(history.render_transcript(), "USER: Start\nASSISTANT: Hello there");
    }

    #[test]
    fn test_transcript_truncates_long_content() {
        let mut history = ConversationHistory::new();
        history.push(Message::user("a".repeat(501)));
        history.push(Message::assistant("b".repeat(500)));
        let transcript = history.render_transcript();
        let lines: Vec<_> = transcript.lines().collect();
        assert_eq!(lines[0], format!("USER: {}...(truncated)", "a".repeat(500)));
        assert_eq!(lines[1], format!("ASSISTANT: {}", "b".repeat(500)));
    }

    #[test]
    fn test_truncate_counts_chars_not_bytes() {
        let text = "é".repeat(600);
        let out = truncate_chars(&text, 500);
        assert_eq!(out.chars().count(), 500 + TRUNCATED_MARKER.len());
    }

    #[test]
    fn test_empty_history_renders_empty() {
        assert_eq!(ConversationHistory::new().render_transcript(), "");
    }
}
