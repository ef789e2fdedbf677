//! HTTP 错误响应：状态码 + `{"error": "..."}`

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::core::InterviewError;

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }
}

impl From<InterviewError> for ApiError {
    fn from(e: InterviewError) -> Self {
        let status = match &e {
            InterviewError::Auth(_) => StatusCode::UNAUTHORIZED,
            InterviewError::Validation(_) => StatusCode::BAD_REQUEST,
            InterviewError::NotFound => StatusCode::NOT_FOUND,
            InterviewError::Forbidden => StatusCode::FORBIDDEN,
            InterviewError::ProviderUnavailable(_) | InterviewError::MalformedProviderResponse(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, "request failed: {}", self.message);
        } else {
            tracing::debug!(status = %self.status, "request rejected: {}", self.message);
        }
        (self.status, Json(serde_json::json!({ "error": self.message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ProviderError;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (InterviewError::Auth("Missing token".into()), StatusCode::UNAUTHORIZED),
            (InterviewError::Validation("No text".into()), StatusCode::BAD_REQUEST),
            (InterviewError::NotFound, StatusCode::NOT_FOUND),
            (InterviewError::Forbidden, StatusCode::FORBIDDEN),
            (
                InterviewError::ProviderUnavailable(ProviderError::Timeout),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                InterviewError::MalformedProviderResponse("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status, status);
        }
    }

    #[test]
    fn test_message_kept() {
        let api = ApiError::from(InterviewError::NotFound);
        assert_eq!(api.message, "Invalid session");
    }
}
