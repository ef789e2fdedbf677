//! Viva - 模拟面试后端
//!
//! 模块划分：
//! - **auth**: Bearer Token 校验（Firebase / 固定映射）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 请求级错误、优雅关闭
//! - **interview**: 会话生命周期、对话与评估编排、模型回复规整
//! - **llm**: 对话模型抽象与实现（Anthropic / Gemini / Mock）
//! - **memory**: 对话历史与文字稿渲染
//! - **observability**: 日志初始化
//! - **provider**: 外部 HTTP 调用（超时、状态码、错误分类）
//! - **tts**: 语音合成与凭据轮询
//! - **web**: axum 路由、认证提取、错误响应

pub mod auth;
pub mod config;
pub mod core;
pub mod interview;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod provider;
pub mod tts;
pub mod web;
