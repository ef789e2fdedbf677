//! Bearer Token 校验
//!
//! TokenVerifier 是外部认证服务的能力抽象：token → {user_id, email}。
//! - FirebaseTokenVerifier：调用 Identity Toolkit `accounts:lookup` 校验 Firebase ID Token
//! - StaticTokenVerifier：固定映射（本地开发与测试）；映射为空时拒绝所有 token

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

use crate::config::AuthSection;
use crate::provider::{ProviderClient, ProviderError};

/// 通过校验的调用者
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
}

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("token rejected")]
    Rejected,

    #[error("auth provider unavailable: {0}")]
    Provider(#[from] ProviderError),
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError>;
}

/// 固定 token 映射
#[derive(Debug, Default)]
pub struct StaticTokenVerifier {
    users: HashMap<String, AuthUser>,
}

impl StaticTokenVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(
        mut self,
        token: impl Into<String>,
        user_id: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        self.users.insert(
            token.into(),
            AuthUser {
                user_id: user_id.into(),
                email: email.into(),
            },
        );
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        self.users.get(token).cloned().ok_or(AuthError::Rejected)
    }
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Firebase ID Token 校验
pub struct FirebaseTokenVerifier {
    provider: ProviderClient,
    api_key: SecretString,
    base_url: String,
    timeout: Duration,
}

impl FirebaseTokenVerifier {
    pub fn new(provider: ProviderClient, api_key: SecretString, cfg: &AuthSection) -> Self {
        Self {
            provider,
            api_key,
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(cfg.timeout_secs),
        }
    }
}

#[async_trait]
impl TokenVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<AuthUser, AuthError> {
        let url = format!("{}/v1/accounts:lookup", self.base_url);
        let body = self
            .provider
            .post_json_text(
                &url,
                &[],
                &[("key", self.api_key.expose_secret())],
                &serde_json::json!({ "idToken": token }),
                self.timeout,
            )
            .await
            .map_err(|e| match e {
                // Identity Toolkit 对无效 token 返回 400
                ProviderError::HttpStatus(400) => AuthError::Rejected,
                other => AuthError::Provider(other),
            })?;

        parse_lookup(&body)
    }
}

fn parse_lookup(body: &str) -> Result<AuthUser, AuthError> {
    let response: LookupResponse = serde_json::from_str(body)
        .map_err(|e| AuthError::Provider(ProviderError::InvalidBody(e.to_string())))?;
    let user = response.users.into_iter().next().ok_or(AuthError::Rejected)?;
    Ok(AuthUser {
        user_id: user.local_id,
        email: user.email.unwrap_or_default(),
    })
}

/// 按配置创建校验器：配置了 Firebase key 时使用 Firebase，否则拒绝所有 token
pub fn create_token_verifier(provider: ProviderClient, cfg: &AuthSection) -> Arc<dyn TokenVerifier> {
    match cfg.firebase_api_key.clone() {
        Some(key) => {
            tracing::info!("Firebase token verification enabled");
            Arc::new(FirebaseTokenVerifier::new(provider, SecretString::from(key), cfg))
        }
        None => {
            tracing::warn!("Firebase not configured, all bearer tokens will be rejected");
            Arc::new(StaticTokenVerifier::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_verifier() {
        let verifier = StaticTokenVerifier::new().with_user("tok-a", "alice", "a@example.com");
        let user = verifier.verify("tok-a").await.unwrap();
        assert_eq!(user.user_id, "alice");
        assert_eq!(user.email, "a@example.com");
        assert!(matches!(verifier.verify("tok-b").await, Err(AuthError::Rejected)));
    }

    #[tokio::test]
    async fn test_empty_static_verifier_rejects_everything() {
        let verifier = StaticTokenVerifier::new();
        assert!(verifier.verify("").await.is_err());
        assert!(verifier.verify("anything").await.is_err());
    }

    #[test]
    fn test_parse_lookup() {
        let user = parse_lookup(r#"{"kind":"x","users":[{"localId":"uid-1","email":"u@x.io"}]}"#)
            .unwrap();
        assert_eq!(user.user_id, "uid-1");
        assert_eq!(user.email, "u@x.io");

        let no_email = parse_lookup(r#"{"users":[{"localId":"uid-2"}]}"#).unwrap();
        assert_eq!(no_email.email, "");

        assert!(matches!(parse_lookup(r#"{"kind":"x"}"#), Err(AuthError::Rejected)));
    }
}
