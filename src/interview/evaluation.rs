//! 面试评估：把完整历史渲染为文字稿，交给评估模型一次性打分
//!
//! 评估不修改会话，可以重复调用；评估之后会话仍可继续对话。

use std::sync::Arc;

use super::normalizer::{normalize, Mode, NormalizedResult};
use super::prompt::{evaluation_request, EVALUATION_INSTRUCTIONS};
use super::session_store::{lock_owned, SessionStore};
use crate::core::InterviewError;
use crate::llm::LlmClient;
use crate::memory::Message;

pub struct Evaluator {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn SessionStore>,
}

impl Evaluator {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn SessionStore>) -> Self {
        Self { llm, store }
    }

    pub async fn evaluate(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<NormalizedResult, InterviewError> {
        // 只在渲染文字稿期间持锁
        let transcript = {
            let session = lock_owned(self.store.as_ref(), session_id, user_id).await?;
            session.history().render_transcript()
        };

        let request = [Message::user(evaluation_request(&transcript))];
        let raw = self.llm.complete(EVALUATION_INSTRUCTIONS, &request).await?;
        let result = normalize(&raw, Mode::Evaluation)?;

        tracing::info!(
            session_id,
            score = ?result.evaluation.as_ref().and_then(|e| e.score),
            "interview evaluated"
        );
        Ok(result)
    }
}
