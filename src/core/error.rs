//! 面试请求的错误类型
//!
//! 每个变体对应一个 HTTP 状态码（见 web::error），在请求边界统一转换为 `{"error": ...}`。

use thiserror::Error;

use crate::interview::normalizer::NormalizeError;
use crate::provider::ProviderError;

#[derive(Error, Debug)]
pub enum InterviewError {
    /// 缺少或无效的 Bearer Token
    #[error("{0}")]
    Auth(String),

    /// 请求缺少必填字段
    #[error("{0}")]
    Validation(String),

    /// 会话不存在
    #[error("Invalid session")]
    NotFound,

    /// 会话属于其他用户
    #[error("Unauthorized")]
    Forbidden,

    /// 外部调用失败、超时或返回非 2xx
    #[error(transparent)]
    ProviderUnavailable(#[from] ProviderError),

    /// 评估结果无法按评分结构解析
    #[error("Malformed provider response: {0}")]
    MalformedProviderResponse(String),
}

impl InterviewError {
    /// ProviderUnavailable 及其子类 MalformedProviderResponse
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            InterviewError::ProviderUnavailable(_) | InterviewError::MalformedProviderResponse(_)
        )
    }
}

impl From<NormalizeError> for InterviewError {
    fn from(e: NormalizeError) -> Self {
        match e {
            NormalizeError::MalformedProviderResponse(msg) => {
                InterviewError::MalformedProviderResponse(msg)
            }
        }
    }
}
