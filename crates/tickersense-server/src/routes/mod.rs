//! HTTP surface.
//!
//! Routes:
//! - `GET /` - liveness string
//! - `GET /api/token` - current proxy credential
//! - `GET /api/:symbol` - live quote merged with an AI sentiment summary
//! - `POST /api/gemini-proxy` - token-gated generative-AI proxy

mod proxy;
mod quote;
mod token;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    // The legacy frontend is served from another origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(liveness))
        // Static route wins over the `:symbol` capture below.
        .route("/api/token", get(token::current_token))
        .route("/api/:symbol", get(quote::live_quote))
        .route("/api/gemini-proxy", post(proxy::gemini_proxy))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn liveness() -> &'static str {
    "tickersense stock & crypto analysis server is up"
}
