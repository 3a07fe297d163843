use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

const AUTH_HEADER: &str = "x-auth-token";

#[derive(Debug, Deserialize)]
pub struct ProxyRequest {
    #[serde(default)]
    prompt: Option<String>,
    /// Optional JSON-schema string forcing structured output.
    #[serde(default)]
    schema: Option<String>,
}

/// Token-gated proxy for arbitrary prompts.
pub async fn gemini_proxy(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ProxyRequest>,
) -> ApiResult<Json<Value>> {
    let candidate = headers
        .get(AUTH_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    if !state.tokens.authorize(candidate).await {
        return Err(ApiError::Unauthorized(String::from(
            "missing or invalid access token",
        )));
    }

    let prompt = request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|prompt| !prompt.is_empty())
        .ok_or_else(|| ApiError::BadRequest(String::from("a non-empty 'prompt' field is required")))?;

    let schema = match request.schema.as_deref() {
        Some(raw) => Some(
            serde_json::from_str::<Value>(raw)
                .map_err(|e| ApiError::BadRequest(format!("'schema' is not valid JSON: {e}")))?,
        ),
        None => None,
    };

    let text = state.summarizer.complete(prompt, schema).await?;
    Ok(Json(json!({ "text": text })))
}
