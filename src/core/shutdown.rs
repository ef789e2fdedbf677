//! 优雅关闭
//!
//! Ctrl+C 或 SIGTERM 到达时记录原因并取消 token。HTTP 服务以 `wait_for_shutdown` 作为关闭信号：
//! 停止接收新连接，等待进行中的请求（包括正在等待模型回复的轮次）完成。

use std::sync::{Arc, OnceLock};

use tokio_util::sync::CancellationToken;

/// 关闭原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ctrl+C
    Interrupt,
    /// SIGTERM（容器平台停止实例）
    Terminate,
}

#[derive(Default)]
pub struct ShutdownManager {
    token: CancellationToken,
    reason: OnceLock<ShutdownReason>,
}

impl ShutdownManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// 触发关闭；只有第一次触发的原因被记录
    pub fn trigger(&self, reason: ShutdownReason) {
        if self.reason.set(reason).is_ok() {
            tracing::info!(?reason, "initiating graceful shutdown");
            self.token.cancel();
        }
    }

    /// 等待关闭信号，返回触发原因
    pub async fn wait_for_shutdown(&self) -> Option<ShutdownReason> {
        self.token.cancelled().await;
        self.reason.get().copied()
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.reason.get().copied()
    }

    /// 后台监听 Ctrl+C 与 SIGTERM，任一到达即触发关闭
    pub fn install_signal_handlers(self: &Arc<Self>) {
        let manager = Arc::clone(self);
        tokio::spawn(async move {
            tokio::select! {
                res = tokio::signal::ctrl_c() => match res {
                    Ok(()) => manager.trigger(ShutdownReason::Interrupt),
                    Err(e) => tracing::warn!("failed to listen for Ctrl+C: {}", e),
                },
                _ = terminate_signal() => manager.trigger(ShutdownReason::Terminate),
            }
        });
    }
}

#[cfg(unix)]
async fn terminate_signal() {
    use tokio::signal::unix::{signal, SignalKind};
    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            sigterm.recv().await;
        }
        Err(e) => {
            tracing::warn!("failed to listen for SIGTERM: {}", e);
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
async fn terminate_signal() {
    std::future::pending::<()>().await;
}
