//! API error type mapped to structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use tickersense_ai::AiError;

/// Route-level error; every variant renders as `{ error, details? }`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),

    /// Generative-AI failure relayed with the upstream status code.
    #[error("generative AI request failed with status {status}")]
    UpstreamAi { status: u16, details: String },
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, details) = match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message, None),
            Self::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message, None),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message, None),
            Self::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message, None),
            Self::UpstreamAi { status, details } => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                String::from("generative AI request failed"),
                Some(details).filter(|details| !details.is_empty()),
            ),
        };

        let mut body = json!({ "error": error });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}

impl From<AiError> for ApiError {
    fn from(error: AiError) -> Self {
        match error {
            AiError::MissingApiKey => {
                Self::Internal(String::from("generative AI API key is not configured"))
            }
            AiError::Upstream { status, details } => Self::UpstreamAi { status, details },
            AiError::Transport(message) => Self::UpstreamAi {
                status: 502,
                details: message,
            },
            other => Self::Internal(other.to_string()),
        }
    }
}

/// Result alias for handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_is_preserved() {
        let error = ApiError::from(AiError::Upstream {
            status: 429,
            details: String::from("quota exceeded"),
        });
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    }

    #[test]
    fn missing_key_maps_to_internal_error() {
        let error = ApiError::from(AiError::MissingApiKey);
        let response = error.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
