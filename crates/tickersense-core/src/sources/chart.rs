use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::{HttpClient, HttpRequest};
use crate::sources::{usable_price, QuoteSource, SourceError, SourceId};
use crate::{ChangePercent, Quote, Ticker};

/// Secondary source: the chart endpoint, consulted when the quote-summary
/// source fails or carries no price.
///
/// The chart meta block has no percent change, so quotes from here carry
/// the `"0.00%"` sentinel.
pub struct ChartSource {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl ChartSource {
    pub const DEFAULT_BASE_URL: &'static str = "https://query1.finance.yahoo.com";

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
        let endpoint = format!(
            "{}/v8/finance/chart/{}?range=1d&interval=1d",
            self.base_url,
            urlencoding::encode(ticker.as_str())
        );

        let response = self
            .http
            .execute(HttpRequest::get(endpoint))
            .await
            .map_err(|e| {
                SourceError::unavailable(format!("chart transport error: {}", e.message()))
            })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "chart returned status {}",
                response.status
            )));
        }

        let parsed: ChartEnvelope = serde_json::from_str(&response.body)
            .map_err(|e| SourceError::malformed(format!("chart body did not parse: {e}")))?;

        let meta = parsed
            .chart
            .and_then(|chart| chart.result.into_iter().flatten().flatten().next())
            .and_then(|result| result.meta)
            .ok_or_else(|| SourceError::no_price("chart response carried no meta block"))?;

        let price = usable_price(meta.regular_market_price)
            .ok_or_else(|| SourceError::no_price("chart meta had no usable market price"))?;

        let display_name = meta
            .short_name
            .clone()
            .or(meta.long_name.clone())
            .unwrap_or_else(|| ticker.as_str().to_owned());

        let currency = meta.currency.clone().unwrap_or_else(|| String::from("USD"));

        Quote::new(
            ticker.clone(),
            display_name,
            currency,
            price,
            Some(ChangePercent::sentinel()),
        )
        .map_err(|e| SourceError::internal(e.to_string()))
    }
}

impl QuoteSource for ChartSource {
    fn id(&self) -> SourceId {
        SourceId::Chart
    }

    fn applies_to(&self, _ticker: &Ticker) -> bool {
        true
    }

    fn fetch<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, SourceError>> + Send + 'a>> {
        Box::pin(self.fetch_inner(ticker))
    }
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    #[serde(default)]
    chart: Option<ChartBody>,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    #[serde(default)]
    result: Option<Vec<Option<ChartResult>>>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Option<ChartMeta>,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<f64>,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
    #[serde(default)]
    currency: Option<String>,
}
