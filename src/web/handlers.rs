//! 路由处理函数
//!
//! 请求体以 `Result<Json<T>, JsonRejection>` 接收，格式错误统一转为 400 `{"error": ...}`。

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::ApiError;
use super::AppState;
use crate::auth::AuthUser;
use crate::interview::{InterviewSetup, NormalizedResult, SessionId};

const DEFAULT_DURATION_MINUTES: u32 = 15;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StartSessionRequest {
    pub domain: Option<String>,
    pub role: Option<String>,
    pub interview_type: Option<String>,
    pub difficulty: Option<String>,
    #[serde(deserialize_with = "lenient_minutes")]
    pub duration: Option<u32>,
}

/// 时长：数字或数字字符串；无法识别时使用默认值
fn lenient_minutes<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_u64().and_then(|m| u32::try_from(m).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: SessionId,
    pub first_question: NormalizedResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ChatRequest {
    pub session_id: Option<String>,
    pub user_message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ResultsRequest {
    pub session_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TtsRequest {
    pub text: Option<String>,
    pub voice_style: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
    pub model: String,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

pub async fn root(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "online",
        model: state.conversation.model().to_string(),
    })
}

pub async fn health() -> &'static str {
    "OK"
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: Result<Json<StartSessionRequest>, JsonRejection>,
) -> Result<Json<StartSessionResponse>, ApiError> {
    let Json(req) = body?;
    let (Some(domain), Some(role)) = (non_empty(req.domain), non_empty(req.role)) else {
        return Err(ApiError::bad_request("Missing domain/role"));
    };

    let mut setup = InterviewSetup::new(domain, role);
    if let Some(interview_type) = non_empty(req.interview_type) {
        setup = setup.with_interview_type(interview_type);
    }
    if let Some(difficulty) = non_empty(req.difficulty) {
        setup = setup.with_difficulty(difficulty);
    }
    // 时长仅记录，不参与提示词
    let duration = req.duration.unwrap_or(DEFAULT_DURATION_MINUTES);
    tracing::debug!(user_id = %user.user_id, duration, "start-session requested");

    let (session_id, first_question) = state
        .conversation
        .start_interview(&user.user_id, &setup)
        .await?;
    Ok(Json(StartSessionResponse {
        session_id,
        first_question,
    }))
}

pub async fn chat(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<NormalizedResult>, ApiError> {
    let Json(req) = body?;
    let session_id = req.session_id.unwrap_or_default();
    let user_message = req.user_message.unwrap_or_default();

    let result = state
        .conversation
        .advance_turn(&user.user_id, &session_id, &user_message)
        .await?;
    Ok(Json(result))
}

pub async fn results(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    body: Result<Json<ResultsRequest>, JsonRejection>,
) -> Result<Json<NormalizedResult>, ApiError> {
    let Json(req) = body?;
    let session_id = req.session_id.unwrap_or_default();

    let result = state.evaluator.evaluate(&user.user_id, &session_id).await?;
    Ok(Json(result))
}

pub async fn tts(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    body: Result<Json<TtsRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = body?;
    let voice_style = req.voice_style.as_deref().unwrap_or("male");

    let text = req.text.unwrap_or_default();
    let audio = state.tts.speak(&text, voice_style).await?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "audio/mpeg")],
        Body::from(audio),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_accepts_number_or_string() {
        let cases = [
            (r#"{"duration": 30}"#, Some(30)),
            (r#"{"duration": "20"}"#, Some(20)),
            (r#"{"duration": "soon"}"#, None),
            (r#"{"duration": null}"#, None),
            (r#"{}"#, None),
        ];
        for (raw, expected) in cases {
            let req: StartSessionRequest = serde_json::from_str(raw).unwrap();
            assert_eq!(req.duration, expected, "{raw}");
        }
    }

    #[test]
    fn test_tts_text_may_be_null() {
        let req: TtsRequest = serde_json::from_str(r#"{"text": null}"#).unwrap();
        assert_eq!(req.text, None);
        let req: TtsRequest = serde_json::from_str(r#"{"voice_style": "female"}"#).unwrap();
        assert_eq!(req.text, None);
    }
}
