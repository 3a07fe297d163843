//! Fixed-priority fallback across quote sources.

use std::sync::Arc;
use std::time::Instant;

use crate::http_client::HttpClient;
use crate::sources::{
    ChartSource, CoinPriceSource, QuoteSource, SourceError, SourceId, QuoteSummarySource,
};
use crate::{Quote, Ticker};

/// Successful fetch: the first structurally valid quote plus the trail of
/// sources attempted before it.
#[derive(Debug)]
pub struct FetchSuccess {
    pub quote: Quote,
    pub source: SourceId,
    pub source_chain: Vec<SourceId>,
    pub errors: Vec<SourceError>,
    pub latency_ms: u64,
}

/// All applicable sources exhausted without a usable price. This is the
/// "not found" outcome; it is not a transport error.
#[derive(Debug)]
pub struct FetchMiss {
    pub source_chain: Vec<SourceId>,
    pub errors: Vec<SourceError>,
    pub latency_ms: u64,
}

pub type FetchResult = Result<FetchSuccess, FetchMiss>;

/// Tries sources in fixed priority order and accepts the first usable
/// quote. Sources that do not apply to the ticker (the coin-price source
/// for equities) are skipped without an error entry.
pub struct QuoteRouter {
    sources: Vec<Arc<dyn QuoteSource>>,
}

impl QuoteRouter {
    pub fn new(sources: Vec<Arc<dyn QuoteSource>>) -> Self {
        Self { sources }
    }

    /// Production chain: quote-summary, then chart, then coin-price.
    pub fn with_default_sources(http: Arc<dyn HttpClient>) -> Self {
        Self::new(vec![
            Arc::new(QuoteSummarySource::new(Arc::clone(&http))),
            Arc::new(ChartSource::new(Arc::clone(&http))),
            Arc::new(CoinPriceSource::new(http)),
        ])
    }

    pub async fn fetch(&self, ticker: &Ticker) -> FetchResult {
        let started = Instant::now();
        let mut source_chain = Vec::with_capacity(self.sources.len());
        let mut errors = Vec::new();

        for source in &self.sources {
            if !source.applies_to(ticker) {
                continue;
            }
            source_chain.push(source.id());

            match source.fetch(ticker).await {
                Ok(quote) => {
                    if !errors.is_empty() {
                        tracing::debug!(
                            %ticker,
                            source = %source.id(),
                            failed_attempts = errors.len(),
                            "quote fallback succeeded"
                        );
                    }
                    return Ok(FetchSuccess {
                        quote,
                        source: source.id(),
                        source_chain,
                        errors,
                        latency_ms: elapsed_ms(started),
                    });
                }
                Err(error) => {
                    tracing::debug!(%ticker, source = %source.id(), %error, "quote source failed");
                    errors.push(error);
                }
            }
        }

        Err(FetchMiss {
            source_chain,
            errors,
            latency_ms: elapsed_ms(started),
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeSource {
        id: SourceId,
        crypto_only: bool,
        outcome: Result<f64, SourceError>,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn priced(id: SourceId, price: f64) -> Arc<Self> {
            Arc::new(Self {
                id,
                crypto_only: false,
                outcome: Ok(price),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(id: SourceId) -> Arc<Self> {
            Arc::new(Self {
                id,
                crypto_only: false,
                outcome: Err(SourceError::unavailable("upstream down")),
                calls: AtomicUsize::new(0),
            })
        }

        fn crypto_only(id: SourceId, price: f64) -> Arc<Self> {
            Arc::new(Self {
                id,
                crypto_only: true,
                outcome: Ok(price),
                calls: AtomicUsize::new(0),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl QuoteSource for FakeSource {
        fn id(&self) -> SourceId {
            self.id
        }

        fn applies_to(&self, ticker: &Ticker) -> bool {
            !self.crypto_only || ticker.is_crypto()
        }

        fn fetch<'a>(
            &'a self,
            ticker: &'a Ticker,
        ) -> Pin<Box<dyn Future<Output = Result<Quote, SourceError>> + Send + 'a>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self.outcome.clone().map(|price| {
                Quote::new(ticker.clone(), ticker.as_str(), "USD", price, None)
                    .expect("fake quotes are valid")
            });
            Box::pin(async move { outcome })
        }
    }

    #[tokio::test]
    async fn primary_success_short_circuits_the_chain() {
        let primary = FakeSource::priced(SourceId::QuoteSummary, 100.0);
        let secondary = FakeSource::priced(SourceId::Chart, 200.0);
        let router = QuoteRouter::new(vec![primary.clone(), secondary.clone()]);
        let ticker = Ticker::parse("BBCA.JK").unwrap();

        let success = router.fetch(&ticker).await.expect("fetch should succeed");
        assert_eq!(success.quote.price, 100.0);
        assert_eq!(success.source, SourceId::QuoteSummary);
        assert_eq!(success.source_chain, vec![SourceId::QuoteSummary]);
        assert_eq!(secondary.call_count(), 0, "secondary must not be consulted");
    }

    #[tokio::test]
    async fn falls_back_past_failing_sources() {
        let primary = FakeSource::failing(SourceId::QuoteSummary);
        let secondary = FakeSource::priced(SourceId::Chart, 200.0);
        let router = QuoteRouter::new(vec![primary, secondary]);
        let ticker = Ticker::parse("BBCA.JK").unwrap();

        let success = router.fetch(&ticker).await.expect("fallback should succeed");
        assert_eq!(success.source, SourceId::Chart);
        assert_eq!(
            success.source_chain,
            vec![SourceId::QuoteSummary, SourceId::Chart]
        );
        assert_eq!(success.errors.len(), 1);
    }

    #[tokio::test]
    async fn exhaustion_is_a_miss_with_the_full_chain() {
        let router = QuoteRouter::new(vec![
            FakeSource::failing(SourceId::QuoteSummary),
            FakeSource::failing(SourceId::Chart),
        ]);
        let ticker = Ticker::parse("NOPE.JK").unwrap();

        let miss = router.fetch(&ticker).await.expect_err("must miss");
        assert_eq!(miss.source_chain, vec![SourceId::QuoteSummary, SourceId::Chart]);
        assert_eq!(miss.errors.len(), 2);
    }

    #[tokio::test]
    async fn crypto_only_source_is_skipped_for_equities() {
        let coin = FakeSource::crypto_only(SourceId::CoinPrice, 50_000.0);
        let router = QuoteRouter::new(vec![
            FakeSource::failing(SourceId::QuoteSummary),
            coin.clone(),
        ]);

        let equity = Ticker::parse("TLKM.JK").unwrap();
        let miss = router.fetch(&equity).await.expect_err("equity must miss");
        assert_eq!(miss.source_chain, vec![SourceId::QuoteSummary]);
        assert_eq!(coin.call_count(), 0);

        let crypto = Ticker::parse("BTC-USD").unwrap();
        let success = router.fetch(&crypto).await.expect("crypto should hit coin source");
        assert_eq!(success.source, SourceId::CoinPrice);
    }
}
