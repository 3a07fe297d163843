use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::Deserialize;

use crate::http_client::{HttpClient, HttpRequest};
use crate::sources::{usable_price, QuoteSource, SourceError, SourceId};
use crate::{ChangePercent, Quote, Ticker};

/// Primary source: the quote-summary endpoint, keyed by ticker path.
///
/// Richest of the three shapes: short/long display names, currency, and a
/// formatted percent change.
pub struct QuoteSummarySource {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl QuoteSummarySource {
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
            "{}/v10/finance/quoteSummary/{}?modules=price",
            self.base_url,
            urlencoding::encode(ticker.as_str())
        );

        let response = self
            .http
            .execute(HttpRequest::get(endpoint))
            .await
            .map_err(|e| {
                SourceError::unavailable(format!("quote-summary transport error: {}", e.message()))
            })?;

        if !response.is_success() {
            return Err(SourceError::unavailable(format!(
                "quote-summary returned status {}",
                response.status
            )));
        }

        let parsed: SummaryEnvelope = serde_json::from_str(&response.body).map_err(|e| {
            SourceError::malformed(format!("quote-summary body did not parse: {e}"))
        })?;

        let price_block = parsed
            .quote_summary
            .and_then(|summary| summary.result.into_iter().flatten().flatten().next())
            .and_then(|result| result.price)
            .ok_or_else(|| {
                SourceError::no_price("quote-summary response carried no price block")
            })?;

        let price = usable_price(price_block.regular_market_price.as_ref().and_then(WrappedValue::raw_value))
            .ok_or_else(|| SourceError::no_price("quote-summary price block had no usable market price"))?;

        let display_name = price_block
            .short_name
            .clone()
            .or(price_block.long_name.clone())
            .unwrap_or_else(|| ticker.as_str().to_owned());

        let currency = price_block
            .currency
            .clone()
            .unwrap_or_else(|| String::from("USD"));

        let change_percent = price_block
            .regular_market_change_percent
            .as_ref()
            .and_then(WrappedValue::to_change_percent);

        Quote::new(ticker.clone(), display_name, currency, price, change_percent)
            .map_err(|e| SourceError::internal(e.to_string()))
    }
}

impl QuoteSource for QuoteSummarySource {
    fn id(&self) -> SourceId {
        SourceId::QuoteSummary
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

// Upstream shapes, modeled Option-rich so any missing nested field degrades
// to an explicit absence instead of a parse failure.

#[derive(Debug, Deserialize)]
struct SummaryEnvelope {
    #[serde(rename = "quoteSummary", default)]
    quote_summary: Option<SummaryBody>,
}

#[derive(Debug, Deserialize)]
struct SummaryBody {
    #[serde(default)]
    result: Option<Vec<Option<SummaryResult>>>,
}

#[derive(Debug, Deserialize)]
struct SummaryResult {
    #[serde(default)]
    price: Option<PriceBlock>,
}

#[derive(Debug, Deserialize)]
struct PriceBlock {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<WrappedValue>,
    #[serde(rename = "regularMarketChangePercent", default)]
    regular_market_change_percent: Option<WrappedValue>,
    #[serde(rename = "shortName", default)]
    short_name: Option<String>,
    #[serde(rename = "longName", default)]
    long_name: Option<String>,
    #[serde(default)]
    currency: Option<String>,
}

/// Numeric fields arrive either bare or wrapped as `{raw, fmt}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WrappedValue {
    Wrapped {
        #[serde(default)]
        raw: Option<f64>,
        #[serde(default)]
        fmt: Option<String>,
    },
    Bare(f64),
}

impl WrappedValue {
    fn raw_value(&self) -> Option<f64> {
        match self {
            Self::Wrapped { raw, .. } => *raw,
            Self::Bare(value) => Some(*value),
        }
    }

    fn to_change_percent(&self) -> Option<ChangePercent> {
        match self {
            Self::Wrapped { fmt: Some(fmt), .. } => Some(ChangePercent::Text(fmt.clone())),
            Self::Wrapped { raw, .. } => raw.map(ChangePercent::Value),
            Self::Bare(value) => Some(ChangePercent::Value(*value)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpResponse};
    use crate::sources::SourceErrorKind;
    use std::sync::Mutex;

    struct CannedHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl CannedHttpClient {
        fn json(body: &str) -> Self {
            Self {
                response: Ok(HttpResponse::ok_json(body)),
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    impl HttpClient for CannedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .push(request);
            let response = self.response.clone();
            Box::pin(async move { response })
        }
    }

    #[tokio::test]
    async fn extracts_quote_from_wrapped_payload() {
        let body = r#"{"quoteSummary":{"result":[{"price":{
            "regularMarketPrice":{"raw":9150.0,"fmt":"9,150.00"},
            "regularMarketChangePercent":{"raw":0.0123,"fmt":"1.23%"},
            "shortName":"Bank Central Asia",
            "currency":"IDR"}}]}}"#;
        let client = Arc::new(CannedHttpClient::json(body));
        let source = QuoteSummarySource::new(client.clone());
        let ticker = Ticker::parse("BBCA.JK").unwrap();

        let quote = source.fetch(&ticker).await.expect("quote should parse");
        assert_eq!(quote.price, 9150.0);
        assert_eq!(quote.display_name, "Bank Central Asia");
        assert_eq!(quote.currency, "IDR");
        assert_eq!(
            quote.change_percent,
            Some(ChangePercent::Text(String::from("1.23%")))
        );

        let requests = client.requests.lock().unwrap();
        assert!(requests[0].url.contains("/v10/finance/quoteSummary/BBCA.JK"));
        assert!(requests[0].url.contains("modules=price"));
    }

    #[tokio::test]
    async fn display_name_falls_back_to_ticker() {
        let body = r#"{"quoteSummary":{"result":[{"price":{
            "regularMarketPrice":{"raw":42.5}}}]}}"#;
        let source = QuoteSummarySource::new(Arc::new(CannedHttpClient::json(body)));
        let ticker = Ticker::parse("XYZ.JK").unwrap();

        let quote = source.fetch(&ticker).await.expect("quote should parse");
        assert_eq!(quote.display_name, "XYZ.JK");
        assert_eq!(quote.currency, "USD");
    }

    #[tokio::test]
    async fn null_price_is_reported_as_no_price() {
        let body = r#"{"quoteSummary":{"result":[{"price":{
            "regularMarketPrice":{"raw":null},"shortName":"Ghost Corp"}}]}}"#;
        let source = QuoteSummarySource::new(Arc::new(CannedHttpClient::json(body)));
        let ticker = Ticker::parse("GHOST.JK").unwrap();

        let error = source.fetch(&ticker).await.expect_err("must miss");
        assert_eq!(error.kind(), SourceErrorKind::NoPrice);
    }

    #[tokio::test]
    async fn empty_result_list_is_no_price_not_a_parse_error() {
        let body = r#"{"quoteSummary":{"result":[],"error":null}}"#;
        let source = QuoteSummarySource::new(Arc::new(CannedHttpClient::json(body)));
        let ticker = Ticker::parse("NOPE.JK").unwrap();

        let error = source.fetch(&ticker).await.expect_err("must miss");
        assert_eq!(error.kind(), SourceErrorKind::NoPrice);
    }
}
