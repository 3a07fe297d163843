use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::{HttpClient, HttpRequest};
use crate::sources::{usable_price, QuoteSource, SourceError, SourceId};
use crate::{Quote, Ticker};

/// Tertiary source: a simple-price endpoint keyed by derived coin
/// identifier. Only applicable to cryptocurrency tickers; no display name
/// and no percent change beyond what the pair itself implies.
pub struct CoinPriceSource {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl CoinPriceSource {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.coingecko.com";

    pub fn new(http: Arc<dyn HttpClient>) -> Self {
        Self::with_base_url(http, Self::DEFAULT_BASE_URL)
    }

    pub fn with_base_url(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    async fn fetch_inner(&self, ticker: &Ticker) -> Result<Quote, SourceError> {
        let coin_id = ticker
            .coin_id()
            .ok_or_else(|| SourceError::internal("coin-price source asked for a non-crypto ticker"))?;

        let endpoint = format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies=usd",
            self.base_url,
            urlencoding::encode(&coin_id)
        );

        let response = self
            .http
            .execute(HttpRequest::get(endpoint))
            .await
            .map_err(|e| {
                SourceError::unavailable(format!("coin-price transport error: {}", e.message()))
            })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "coin-price returned status {}",
                response.status
            )));
        }

        let parsed: HashMap<String, CoinEntry> = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::malformed(format!("coin-price body did not parse: {e}")))?;

        let price = usable_price(parsed.get(&coin_id).and_then(|entry| entry.usd))
            .ok_or_else(|| {
                SourceError::no_price(format!("coin-price had no usd price for '{coin_id}'"))
            })?;

        // The pair's base segment is the best display name this source has.
        let display_name = ticker
            .as_str()
            .split('-')
            .next()
            .unwrap_or(ticker.as_str())
            .to_owned();

        Quote::new(ticker.clone(), display_name, "USD", price, None)
            .map_err(|e| SourceError::internal(e.to_string()))
    }
}

impl QuoteSource for CoinPriceSource {
    fn id(&self) -> SourceId {
        SourceId::CoinPrice
    }

    fn applies_to(&self, ticker: &Ticker) -> bool {
        ticker.is_crypto()
    }

    fn fetch<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_inner(ticker))
    }
}

#[derive(Debug, Deserialize)]
struct CoinEntry {
    #[serde(default)]
    usd: Option<f64>,
}
