//! The analysis cycle: fetch, summarize, persist, one ticker at a time.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tickersense_core::{AnalysisRecord, Ticker, UtcTimestamp};

use crate::state::AppState;

/// Pause between tickers so upstream rate limits are respected.
pub const DEFAULT_TICKER_PAUSE: Duration = Duration::from_millis(2_500);

const ANALYSIS_PATH_PREFIX: &str = "analysis";

/// Runs one pass over the configured ticker list.
///
/// Tickers are processed strictly sequentially; a miss or a persistence
/// failure is logged and never aborts the pass. Overlapping invocations
/// (a pass outlasting its schedule interval) are skipped via a
/// single-flight guard rather than interleaved.
pub struct AnalysisCycle {
    state: AppState,
    ticker_pause: Duration,
    in_flight: AtomicBool,
}

impl AnalysisCycle {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            ticker_pause: DEFAULT_TICKER_PAUSE,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_ticker_pause(mut self, pause: Duration) -> Self {
        self.ticker_pause = pause;
        self
    }

    pub async fn run(&self) {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::warn!("analysis cycle already in progress; skipping this run");
            return;
        }

        tracing::info!(tickers = self.state.tickers.len(), "analysis cycle starting");

        for (index, ticker) in self.state.tickers.iter().enumerate() {
            if index > 0 && !self.ticker_pause.is_zero() {
                tokio::time::sleep(self.ticker_pause).await;
            }
            self.process(ticker).await;
        }

        tracing::info!("analysis cycle finished");
        self.in_flight.store(false, Ordering::SeqCst);
    }

    async fn process(&self, ticker: &Ticker) {
        let fetched = match self.state.quotes.fetch(ticker).await {
            Ok(success) => success,
            Err(miss) => {
                tracing::warn!(
                    %ticker,
                    sources_tried = miss.source_chain.len(),
                    "no usable quote from any source; skipping ticker"
                );
                return;
            }
        };

        let quote = fetched.quote;
        let analysis = self
            .state
            .summarizer
            .summarize(&quote.display_name, ticker.is_crypto())
            .await;

        let record = AnalysisRecord::merge(quote, analysis, UtcTimestamp::now());
        let path = format!("{ANALYSIS_PATH_PREFIX}/{}", ticker.storage_key());

        match self.state.store.set(&path, &record).await {
            Ok(()) => tracing::info!(%ticker, path = %path, "analysis record stored"),
            Err(error) => tracing::error!(%ticker, %error, "failed to persist analysis record"),
        }
    }
}
