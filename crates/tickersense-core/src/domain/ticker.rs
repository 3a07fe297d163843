use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_TICKER_LEN: usize = 15;

/// Quote-currency suffixes that mark a ticker as a cryptocurrency pair.
const CRYPTO_QUOTE_SUFFIXES: &[&str] = &["-USD", "-USDT"];

/// Normalized asset identifier: an exchange-suffixed equity (`BBCA.JK`)
/// or a quote-currency-suffixed cryptocurrency pair (`BTC-USD`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Ticker(String);

impl Ticker {
    /// Parse and normalize a ticker to uppercase.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyTicker);
        }

        let normalized = trimmed.to_ascii_uppercase();
        let len = normalized.chars().count();
        if len > MAX_TICKER_LEN {
            return Err(ValidationError::TickerTooLong {
                len,
                max: MAX_TICKER_LEN,
            });
        }

        if let Some(first) = normalized.chars().next() {
            if !first.is_ascii_alphabetic() {
                return Err(ValidationError::TickerInvalidStart { ch: first });
            }
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '.' || ch == '-';
            if !valid {
                return Err(ValidationError::TickerInvalidChar { ch, index });
            }
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this ticker names a cryptocurrency pair (suffix match).
    pub fn is_crypto(&self) -> bool {
        CRYPTO_QUOTE_SUFFIXES
            .iter()
            .any(|suffix| self.0.ends_with(suffix))
    }

    /// Coin identifier used by the tertiary crypto price source.
    ///
    /// Derived from the base segment of the pair; well-known coins map to
    /// their canonical identifiers, anything else falls back to the
    /// lowercased base symbol. `None` for non-crypto tickers.
    pub fn coin_id(&self) -> Option<String> {
        if !self.is_crypto() {
            return None;
        }

        let base = self.0.split('-').next().unwrap_or(&self.0);
        let id = match base {
            "BTC" => "bitcoin",
            "ETH" => "ethereum",
            "SOL" => "solana",
            "BNB" => "binancecoin",
            "XRP" => "ripple",
            "ADA" => "cardano",
            "DOGE" => "dogecoin",
            other => return Some(other.to_ascii_lowercase()),
        };

        Some(id.to_owned())
    }

    /// Deterministic storage key: separator characters become underscores
    /// so the ticker is usable as a key-value store path segment.
    pub fn storage_key(&self) -> String {
        self.0
            .chars()
            .map(|ch| if ch == '.' || ch == '-' { '_' } else { ch })
            .collect()
    }
}

impl Display for Ticker {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Ticker {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for Ticker {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Ticker> for String {
    fn from(value: Ticker) -> Self {
        value.0
    }
}
