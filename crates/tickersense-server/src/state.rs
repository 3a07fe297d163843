use std::sync::Arc;

use tickersense_ai::Summarizer;
use tickersense_core::{QuoteRouter, RealtimeStore, Ticker, TokenAuthority};

/// Shared handles injected into every route handler and the analysis
/// cycle. The token authority owns the current-credential state; nothing
/// here is a module-level global.
#[derive(Clone)]
pub struct AppState {
    pub quotes: Arc<QuoteRouter>,
    pub summarizer: Arc<Summarizer>,
    pub tokens: Arc<TokenAuthority>,
    pub store: RealtimeStore,
    pub tickers: Arc<Vec<Ticker>>,
}
