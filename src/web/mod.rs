//! HTTP 接口
//!
//! | 路由 | 说明 |
//! |---|---|
//! | `GET /` | 服务状态与对话模型名 |
//! | `GET /api/health` | 存活探针 |
//! | `POST /api/start-session` | 开始面试 |
//! | `POST /api/chat` | 推进一轮对话 |
//! | `POST /api/results` | 生成评估 |
//! | `POST /api/tts` | 语音合成 |
//!
//! CORS 只作用于 `/api/*`。

pub mod error;
pub mod extract;
pub mod handlers;

use std::sync::Arc;

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenVerifier;
use crate::interview::{ConversationOrchestrator, Evaluator};
use crate::tts::TtsService;

pub use error::ApiError;

/// 共享状态
pub struct AppState {
    pub conversation: ConversationOrchestrator,
    pub evaluator: Evaluator,
    pub tts: TtsService,
    pub verifier: Arc<dyn TokenVerifier>,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
}

pub fn create_router(state: Arc<AppState>, allowed_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/start-session", post(handlers::start_session))
        .route("/api/chat", post(handlers::chat))
        .route("/api/results", post(handlers::results))
        .route("/api/tts", post(handlers::tts))
        .layer(cors_layer(allowed_origins));

    Router::new()
        .route("/", get(handlers::root))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
