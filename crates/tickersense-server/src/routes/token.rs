use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Current credential value; 500 until the first rotation has run.
pub async fn current_token(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    match state.tokens.current().await {
        Some(credential) => Ok(Json(json!({ "token": credential.value }))),
        None => Err(ApiError::Internal(String::from(
            "no access credential has been issued yet",
        ))),
    }
}
