use serde::{Deserialize, Serialize};

use crate::{Ticker, UtcTimestamp, ValidationError};

/// Percent change as upstream sources deliver it: the primary source
/// formats it (`"1.23%"`), others return a raw number or omit it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChangePercent {
    Value(f64),
    Text(String),
}

impl ChangePercent {
    /// Sentinel used by sources that cannot report a percent change.
    pub const SENTINEL: &'static str = "0.00%";

    pub fn sentinel() -> Self {
        Self::Text(String::from(Self::SENTINEL))
    }
}

/// Snapshot of an asset's current price and metadata.
///
/// A quote always carries a usable price; "no price anywhere" is a fetch
/// miss, never a zero/garbage quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    #[serde(rename = "symbol")]
    pub ticker: Ticker,
    pub display_name: String,
    pub currency: String,
    pub price: f64,
    pub change_percent: Option<ChangePercent>,
}

impl Quote {
    pub fn new(
        ticker: Ticker,
        display_name: impl Into<String>,
        currency: impl Into<String>,
        price: f64,
        change_percent: Option<ChangePercent>,
    ) -> Result<Self, ValidationError> {
        if !price.is_finite() {
            return Err(ValidationError::NonFiniteValue { field: "price" });
        }
        if price < 0.0 {
            return Err(ValidationError::NegativeValue { field: "price" });
        }

        Ok(Self {
            ticker,
            display_name: display_name.into(),
            currency: currency.into(),
            price,
            change_percent,
        })
    }
}

/// Quote merged with its AI sentiment summary, as persisted per ticker.
/// Each cycle overwrites the prior record at the same key; no history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub symbol: String,
    pub display_name: String,
    pub currency: String,
    pub price: f64,
    pub change_percent: Option<ChangePercent>,
    pub ai_analysis: String,
    pub last_updated: UtcTimestamp,
}

impl AnalysisRecord {
    pub fn merge(quote: Quote, ai_analysis: impl Into<String>, last_updated: UtcTimestamp) -> Self {
        Self {
            symbol: quote.ticker.as_str().to_owned(),
            display_name: quote.display_name,
            currency: quote.currency,
            price: quote.price,
            change_percent: quote.change_percent,
            ai_analysis: ai_analysis.into(),
            last_updated,
        }
    }
}

/// Short-lived shared secret authorizing the AI proxy route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub value: String,
    pub created_at: UtcTimestamp,
}

impl Credential {
    pub fn issue(value: impl Into<String>, created_at: UtcTimestamp) -> Result<Self, ValidationError> {
        let value = value.into();
        let valid = value.len() == 6 && value.chars().all(|ch| ch.is_ascii_digit());
        if !valid {
            return Err(ValidationError::InvalidCredentialValue { value });
        }

        Ok(Self { value, created_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn change_percent_deserializes_both_shapes() {
        let text: ChangePercent = serde_json::from_str("\"1.23%\"").expect("text form");
        assert_eq!(text, ChangePercent::Text(String::from("1.23%")));

        let value: ChangePercent = serde_json::from_str("-0.5").expect("numeric form");
        assert_eq!(value, ChangePercent::Value(-0.5));
    }

    #[test]
    fn quote_rejects_non_finite_price() {
        let ticker = Ticker::parse("BTC-USD").unwrap();
        let err = Quote::new(ticker, "Bitcoin", "USD", f64::NAN, None).expect_err("must fail");
        assert!(matches!(err, ValidationError::NonFiniteValue { .. }));
    }

    #[test]
    fn analysis_record_serializes_camel_case() {
        let ticker = Ticker::parse("BTC-USD").unwrap();
        let quote = Quote::new(ticker, "Bitcoin", "USD", 50_000.0, Some(ChangePercent::sentinel()))
            .expect("valid quote");
        let record = AnalysisRecord::merge(
            quote,
            "Sentiment is mildly bullish.",
            UtcTimestamp::parse("2025-06-01T00:00:00Z").unwrap(),
        );

        let json = serde_json::to_value(&record).expect("serializable");
        assert_eq!(json["symbol"], "BTC-USD");
        assert_eq!(json["aiAnalysis"], "Sentiment is mildly bullish.");
        assert_eq!(json["lastUpdated"], "2025-06-01T00:00:00Z");
        assert_eq!(json["changePercent"], "0.00%");
    }

    #[test]
    fn credential_requires_six_digits() {
        let now = UtcTimestamp::now();
        assert!(Credential::issue("123456", now).is_ok());
        assert!(Credential::issue("12345", now).is_err());
        assert!(Credential::issue("1234567", now).is_err());
        assert!(Credential::issue("12a456", now).is_err());
    }
}
