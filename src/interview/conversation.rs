//! 面试对话编排
//!
//! - start_interview：拼 system 指令 → 开场消息 → 调用对话模型 → 成功后才创建会话
//! - advance_turn：锁定会话 → 递增轮次 → 以包裹后的用户消息调用模型 → 历史写入原始文本与回复

use std::sync::Arc;

use super::normalizer::{normalize, Mode, NormalizedResult};
use super::prompt::{interviewer_system_prompt, turn_envelope, InterviewSetup, OPENING_MESSAGE};
use super::session::{Session, SessionId};
use super::session_store::{lock_owned, SessionStore};
use crate::core::InterviewError;
use crate::llm::LlmClient;
use crate::memory::{ConversationHistory, Message};

/// 对话编排器：持有对话模型与会话存储
pub struct ConversationOrchestrator {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn SessionStore>,
}

impl ConversationOrchestrator {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn SessionStore>) -> Self {
        Self { llm, store }
    }

    pub fn model(&self) -> &str {
        self.llm.model()
    }

    /// 开始面试；模型调用或解析失败时不创建会话
    pub async fn start_interview(
        &self,
        user_id: &str,
        setup: &InterviewSetup,
    ) -> Result<(SessionId, NormalizedResult), InterviewError> {
        let system_prompt = interviewer_system_prompt(setup);
        let mut history = ConversationHistory::new();
        history.push(Message::user(OPENING_MESSAGE));

        let raw = self.llm.complete(&system_prompt, history.messages()).await?;
        let result = normalize(&raw, Mode::Conversation)?;
        history.push(Message::assistant(result.text_response.clone()));

        let session_id = self
            .store
            .create(Session::new(user_id, system_prompt, history))
            .await;
        tracing::info!(
            session_id = %session_id,
            user_id,
            domain = %setup.domain,
            role = %setup.role,
            "interview started"
        );
        Ok((session_id, result))
    }

    /// 推进一轮对话；同一会话的并发调用在会话锁上串行
    pub async fn advance_turn(
        &self,
        user_id: &str,
        session_id: &str,
        user_text: &str,
    ) -> Result<NormalizedResult, InterviewError> {
        let mut session = lock_owned(self.store.as_ref(), session_id, user_id).await?;
        if user_text.trim().is_empty() {
            return Err(InterviewError::Validation("Missing user_message".to_string()));
        }

        let exchange = session.begin_exchange();
        let mut outbound = session.history().messages().to_vec();
        outbound.push(Message::user(turn_envelope(exchange, user_text)));

        let raw = self
            .llm
            .complete(session.system_prompt(), &outbound)
            .await
            .inspect_err(|e| {
                tracing::warn!(session_id, exchange, "turn failed, history unchanged: {}", e)
            })?;
        let result = normalize(&raw, Mode::Conversation)?;

        session.record_turn(user_text, result.text_response.clone());
        tracing::debug!(session_id, exchange, end = result.end, "turn recorded");
        Ok(result)
    }
}
