//! 面试会话
//!
//! 会话由创建者独占：user_id 创建后不可变，只有创建者能推进对话或请求评估。
//! 历史只追加；除对话轮次外没有任何操作会修改会话。

use chrono::{DateTime, Utc};

use crate::core::InterviewError;
use crate::memory::{ConversationHistory, Message};

/// 会话 ID（UUID v4，不可猜测）
pub type SessionId = String;

/// 单个面试会话
#[derive(Debug, Clone)]
pub struct Session {
    id: SessionId,
    user_id: String,
    system_prompt: String,
    history: ConversationHistory,
    created_at: DateTime<Utc>,
    /// 已处理的用户轮次数（在调用模型前递增，失败不回退）
    exchange_count: u32,
    /// 预留字段，始终为 0
    question_count: u32,
}

impl Session {
    pub fn new(
        user_id: impl Into<String>,
        system_prompt: impl Into<String>,
        history: ConversationHistory,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            system_prompt: system_prompt.into(),
            history,
            created_at: Utc::now(),
            exchange_count: 0,
            question_count: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn exchange_count(&self) -> u32 {
        self.exchange_count
    }

    pub fn question_count(&self) -> u32 {
        self.question_count
    }

    /// 非创建者访问返回 Forbidden
    pub fn must_own(&self, user_id: &str) -> Result<(), InterviewError> {
        if self.user_id == user_id {
            Ok(())
        } else {
            Err(InterviewError::Forbidden)
        }
    }

    /// 开始新一轮，返回本轮序号
    pub fn begin_exchange(&mut self) -> u32 {
        self.exchange_count += 1;
        self.exchange_count
    }

    /// 记录成功的一轮：原始用户文本 + 助手回复
    pub fn record_turn(&mut self, user_text: impl Into<String>, assistant_text: impl Into<String>) {
        self.history.push(Message::user(user_text));
        self.history.push(Message::assistant(assistant_text));
    }
}
