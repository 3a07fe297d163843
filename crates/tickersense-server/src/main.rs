use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use tickersense_ai::Summarizer;
use tickersense_core::http_client::{HttpClient, ReqwestHttpClient};
use tickersense_core::{QuoteRouter, RealtimeStore, TokenAuthority};

use tickersense_server::state::AppState;
use tickersense_server::{build_router, scheduler, ServerConfig};

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("tickersense_server=info,tickersense_core=info,tickersense_ai=info,tower_http=info")
        }))
        .init();

    let config = ServerConfig::from_env();
    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY is not set; AI summaries will be unavailable");
    }

    let http: Arc<dyn HttpClient> = Arc::new(ReqwestHttpClient::new());
    let store = RealtimeStore::new(Arc::clone(&http), config.store_url.clone());

    let state = AppState {
        quotes: Arc::new(QuoteRouter::with_default_sources(Arc::clone(&http))),
        summarizer: Arc::new(Summarizer::new(
            Arc::clone(&http),
            config.gemini_api_key.clone(),
        )),
        tokens: Arc::new(TokenAuthority::new(store.clone())),
        store,
        tickers: Arc::new(config.tickers.clone()),
    };

    scheduler::spawn(state.clone(), &config, http);

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "tickersense server listening");
    axum::serve(listener, app).await
}
