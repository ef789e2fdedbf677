//! 会话存储抽象层
//!
//! 编排逻辑只依赖 SessionStore trait；进程内实现为按 key 加锁的 HashMap。
//! 每个会话自带一把 Mutex：同一会话的并发轮次串行执行，不同会话互不阻塞。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

use super::session::{Session, SessionId};
use crate::core::InterviewError;

/// 会话句柄：持有者在锁内独占读写
pub type SessionHandle = Arc<Mutex<Session>>;

/// 会话存储接口
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 保存新会话，返回其 ID
    async fn create(&self, session: Session) -> SessionId;

    /// 取会话；不存在返回 NotFound
    async fn get(&self, session_id: &str) -> Result<SessionHandle, InterviewError>;

    /// 当前会话数
    async fn active_count(&self) -> usize;
}

/// 取会话并加锁，校验归属；返回的 guard 在作用域内独占该会话
pub async fn lock_owned(
    store: &dyn SessionStore,
    session_id: &str,
    user_id: &str,
) -> Result<OwnedMutexGuard<Session>, InterviewError> {
    let handle = store.get(session_id).await?;
    let session = handle.lock_owned().await;
    session.must_own(user_id)?;
    Ok(session)
}

/// 内存会话存储；进程退出即丢失，不做过期清理
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn create(&self, session: Session) -> SessionId {
        let session_id = session.id().to_string();
        self.sessions
            .write()
            .await
            .insert(session_id.clone(), Arc::new(Mutex::new(session)));
        session_id
    }

    async fn get(&self, session_id: &str) -> Result<SessionHandle, InterviewError> {
        self.sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .ok_or(InterviewError::NotFound)
    }

    async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

/// 创建会话存储
pub fn create_session_store() -> Arc<dyn SessionStore> {
    tracing::info!("Using in-memory session store");
    Arc::new(MemorySessionStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::ConversationHistory;

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemorySessionStore::new();
        let id = store
            .create(Session::new("alice", "sys", ConversationHistory::new()))
            .await;
        let handle = store.get(&id).await.unwrap();
        assert_eq!(handle.lock().await.user_id(), "alice");
        assert_eq!(store.active_count().await, 1);
    }

    #[tokio::test]
    async fn test_unknown_session_is_not_found() {
        let store = MemorySessionStore::new();
        assert!(matches!(store.get("nope").await, Err(InterviewError::NotFound)));
    }

    #[tokio::test]
    async fn test_lock_owned_checks_owner() {
        let store = MemorySessionStore::new();
        let id = store
            .create(Session::new("alice", "sys", ConversationHistory::new()))
            .await;
        assert!(lock_owned(&store, &id, "alice").await.is_ok());
        assert!(matches!(
            lock_owned(&store, &id, "bob").await,
            Err(InterviewError::Forbidden)
        ));
        assert!(matches!(
            lock_owned(&store, "missing", "alice").await,
            Err(InterviewError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_lock_is_exclusive_per_session() {
        let store = Arc::new(MemorySessionStore::new());
        let a = store
            .create(Session::new("alice", "sys", ConversationHistory::new()))
            .await;
        let b = store
            .create(Session::new("alice", "sys", ConversationHistory::new()))
            .await;

        let guard_a = lock_owned(store.as_ref(), &a, "alice").await.unwrap();
        // 其他会话不受影响
        assert!(lock_owned(store.as_ref(), &b, "alice").await.is_ok());
        // 同一会话需等待
        let handle = store.get(&a).await.unwrap();
        assert!(handle.try_lock().is_err());
        drop(guard_a);
        assert!(handle.try_lock().is_ok());
    }
}
