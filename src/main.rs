//! Viva - 模拟面试后端
//!
//! 入口：加载 .env 与配置、初始化日志、装配对话/评估/语音/认证组件，启动 HTTP 服务。

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use viva::{
    auth::create_token_verifier,
    config::load_config,
    core::ShutdownManager,
    interview::{create_session_store, ConversationOrchestrator, Evaluator},
    llm::{AnthropicClient, GeminiClient},
    observability,
    provider::ProviderClient,
    tts::{ElevenLabsClient, TtsService},
    web::{create_router, AppState},
};

const CONNECT_TIMEOUT_SECS: u64 = 10;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env 不存在时忽略
    let _ = dotenvy::dotenv();
    observability::init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let cfg = load_config(config_path).context("Failed to load configuration")?;

    if cfg.llm.conversation.api_key.is_none() {
        tracing::warn!("Claude API key missing, start-session and chat will fail");
    }
    if cfg.llm.evaluation.api_key.is_none() {
        tracing::warn!("Gemini API key missing, results will fail");
    }
    if cfg.tts.keys.is_empty() {
        tracing::warn!("No ElevenLabs keys configured, tts will fail");
    }

    // 单次调用的超时由各 provider 配置决定，这里只限制建连
    let http = reqwest::Client::builder()
        .user_agent(concat!("viva/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .build()
        .context("Failed to build HTTP client")?;
    let provider = ProviderClient::with_client(http);
    let store = create_session_store();
    let conversation = ConversationOrchestrator::new(
        Arc::new(AnthropicClient::new(provider.clone(), &cfg.llm.conversation)),
        Arc::clone(&store),
    );
    let evaluator = Evaluator::new(
        Arc::new(GeminiClient::new(provider.clone(), &cfg.llm.evaluation)),
        Arc::clone(&store),
    );
    let tts = TtsService::from_config(
        Arc::new(ElevenLabsClient::new(provider.clone(), &cfg.tts)),
        &cfg.tts,
    );
    tracing::info!(keys = tts.key_count(), "ElevenLabs key pool loaded");
    let verifier = create_token_verifier(provider, &cfg.auth);

    let state = Arc::new(AppState {
        conversation,
        evaluator,
        tts,
        verifier,
    });
    let app = create_router(state, &cfg.server.allowed_origins);

    let shutdown = Arc::new(ShutdownManager::new());
    shutdown.install_signal_handlers();

    let addr: SocketAddr = format!("{}:{}", cfg.server.host, cfg.server.port())
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", cfg.server.host, cfg.server.port()))?;
    tracing::info!(model = %cfg.llm.conversation.model, "Viva listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let signal = Arc::clone(&shutdown);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            signal.wait_for_shutdown().await;
        })
        .await?;

    tracing::info!(
        reason = ?shutdown.reason(),
        sessions = store.active_count().await,
        "server stopped"
    );
    Ok(())
}
