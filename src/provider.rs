//! 外部服务调用：带超时的 JSON POST
//!
//! 对话模型、评估模型、语音合成三个外部端点共用 ProviderClient。
//! 本层不做重试：单次失败直接以 ProviderError 返回给调用方。

use std::time::Duration;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use serde::Serialize;
use thiserror::Error;

/// 外部服务调用失败的种类
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    #[error("provider request timed out")]
    Timeout,

    #[error("provider transport error: {0}")]
    Transport(String),

    #[error("provider returned HTTP {0}")]
    HttpStatus(u16),

    /// 2xx 响应，但响应体不是预期的结构
    #[error("provider returned an unexpected body: {0}")]
    InvalidBody(String),

    /// 凭据缺失，请求未发出
    #[error("{0}")]
    NotConfigured(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else {
            ProviderError::Transport(e.to_string())
        }
    }
}

/// 通用 HTTP 调用能力：一次请求对应一次出站网络调用
#[derive(Debug, Clone, Default)]
pub struct ProviderClient {
    http: reqwest::Client,
}

impl ProviderClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// POST JSON，返回原始响应体；非 2xx 返回 HttpStatus，响应正文只写日志
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: &[(&'static str, &str)],
        query: &[(&str, &str)],
        payload: &T,
        timeout: Duration,
    ) -> Result<Bytes, ProviderError> {
        let header_map = build_headers(headers)?;

        let resp = self
            .http
            .post(url)
            .headers(header_map)
            .query(query)
            .json(payload)
            .timeout(timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::warn!(%url, status = status.as_u16(), "provider error response: {}", body);
            return Err(ProviderError::HttpStatus(status.as_u16()));
        }

        Ok(resp.bytes().await?)
    }

    /// post_json 的文本版本
    pub async fn post_json_text<T: Serialize + ?Sized>(
        &self,
        url: &str,
        headers: &[(&'static str, &str)],
        query: &[(&str, &str)],
        payload: &T,
        timeout: Duration,
    ) -> Result<String, ProviderError> {
        let body = self.post_json(url, headers, query, payload, timeout).await?;
        String::from_utf8(body.to_vec()).map_err(|e| ProviderError::InvalidBody(e.to_string()))
    }
}

fn build_headers(headers: &[(&'static str, &str)]) -> Result<HeaderMap, ProviderError> {
    let mut map = HeaderMap::with_capacity(headers.len() + 1);
    map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    for (name, value) in headers {
        let value = HeaderValue::from_str(value)
            .map_err(|_| ProviderError::NotConfigured(format!("invalid value for header {name}")))?;
        map.insert(HeaderName::from_static(name), value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_headers_sets_content_type() {
        let map = build_headers(&[("x-api-key", "k-1")]).unwrap();
        assert_eq!(map.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(map.get("x-api-key").unwrap(), "k-1");
    }

    #[test]
    fn test_build_headers_rejects_control_chars() {
        let err = build_headers(&[("x-api-key", "bad\nkey")]).unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(ProviderError::HttpStatus(529).to_string(), "provider returned HTTP 529");
        assert_eq!(ProviderError::Timeout.to_string(), "provider request timed out");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(1))
            .build()
            .unwrap();
        let client = ProviderClient::with_client(http);
        let err = client
            .post_json(
                "http://127.0.0.1:9/unreachable",
                &[],
                &[],
                &serde_json::json!({}),
                Duration::from_secs(2),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Transport(_) | ProviderError::Timeout));
    }
}
