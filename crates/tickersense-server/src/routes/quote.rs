use axum::extract::{Path, State};
use axum::Json;
use serde_json::{json, Value};

use tickersense_core::Ticker;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Live view for one ticker: fresh quote plus an on-demand AI summary.
///
/// The response carries a compatibility envelope mirroring the upstream
/// chart shape (`chart.result[0].meta`) that the legacy frontend reads.
pub async fn live_quote(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<Value>> {
    let ticker = Ticker::parse(&symbol).map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let fetched = state
        .quotes
        .fetch(&ticker)
        .await
        .map_err(|miss| {
            tracing::info!(
                %ticker,
                sources_tried = miss.source_chain.len(),
                "live quote lookup missed"
            );
            ApiError::NotFound(format!("no quote data found for {ticker}"))
        })?;

    let quote = fetched.quote;
    let analysis = state
        .summarizer
        .summarize(&quote.display_name, ticker.is_crypto())
        .await;

    let mut body = serde_json::to_value(&quote).map_err(|e| ApiError::Internal(e.to_string()))?;
    let compat_envelope = json!({
        "result": [{
            "meta": {
                "regularMarketPrice": quote.price,
                "instrumentDisplayName": quote.display_name,
            }
        }]
    });

    if let Some(map) = body.as_object_mut() {
        map.insert(String::from("aiAnalysis"), json!(analysis));
        map.insert(String::from("chart"), compat_envelope);
    }

    Ok(Json(body))
}
