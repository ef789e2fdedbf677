//! 面试核心：会话生命周期、对话编排、评估编排、模型回复规整

pub mod conversation;
pub mod evaluation;
pub mod normalizer;
pub mod prompt;
pub mod session;
pub mod session_store;

pub use conversation::ConversationOrchestrator;
pub use evaluation::Evaluator;
pub use normalizer::{normalize, EvaluationScores, Mode, NormalizeError, NormalizedResult};
pub use prompt::InterviewSetup;
pub use session::{Session, SessionId};
pub use session_store::{create_session_store, MemorySessionStore, SessionHandle, SessionStore};
