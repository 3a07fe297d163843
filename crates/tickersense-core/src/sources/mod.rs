//! Upstream quote sources.
//!
//! Each source wraps one read-only JSON endpoint and normalizes its payload
//! into a [`Quote`](crate::Quote). Sources are tried by the router in fixed
//! priority order; see [`crate::routing`].

mod chart;
mod coin_price;
mod quote_summary;

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

pub use chart::ChartSource;
pub use coin_price::CoinPriceSource;
pub use quote_summary::QuoteSummarySource;

use crate::{Quote, Ticker};

/// Identifiers for the fixed source chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceId {
    QuoteSummary,
    Chart,
    CoinPrice,
}

impl SourceId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QuoteSummary => "quote_summary",
            Self::Chart => "chart",
            Self::CoinPrice => "coin_price",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-source failure classification.
///
/// None of these are fatal to a fetch: the router records the error and
/// moves on to the next source in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    /// Transport failure or non-OK upstream status.
    Unavailable,
    /// Structurally valid response that carried no usable price.
    NoPrice,
    /// Response body that did not parse as the expected shape.
    Malformed,
    Internal,
}

/// Structured source error accumulated by the router during fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
        }
    }

    pub fn no_price(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NoPrice,
            message: message.into(),
        }
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Malformed,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::NoPrice => "source.no_price",
            SourceErrorKind::Malformed => "source.malformed",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Source adapter contract.
///
/// Implementations must be `Send + Sync`; the router holds them behind
/// trait objects and tries them sequentially.
pub trait QuoteSource: Send + Sync {
    /// Identifier used in logs and fetch results.
    fn id(&self) -> SourceId;

    /// Whether this source can serve the given ticker at all. Sources that
    /// only cover one asset class (the coin-price source) return `false`
    /// for everything else and are skipped without an error entry.
    fn applies_to(&self, ticker: &Ticker) -> bool;

    /// Fetch and normalize a quote.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when the upstream is unreachable, returns a
    /// non-OK status, delivers an unparseable body, or carries no usable
    /// price. All of these mean "try the next source".
    fn fetch<'a>(
        &'a self,
        ticker: &'a Ticker,
    ) -> Pin<Box<dyn Future<Output = Result<Quote, SourceError>> + Send + 'a>>;
}

/// A price is usable when it is a real, positive number. Zero and
/// non-finite values are treated the same as an absent field.
pub(crate) fn usable_price(value: Option<f64>) -> Option<f64> {
    value.filter(|price| price.is_finite() && *price > 0.0)
}
