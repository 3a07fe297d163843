//! # Tickersense Core
//!
//! Core contracts and domain types for the tickersense analysis service.
//!
//! ## Overview
//!
//! This crate provides the foundational components:
//!
//! - **Canonical domain models** for tickers, quotes, analysis records, and
//!   credentials
//! - **Quote source adapters** for the three upstream price endpoints
//! - **Fallback routing** that accepts the first usable quote in priority
//!   order
//! - **Realtime store client** for the remote key-value cache
//! - **Token authority** owning the rotating proxy credential
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Domain models (Ticker, Quote, AnalysisRecord, Credential) |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP client abstraction |
//! | [`retry`] | Bounded retry with backoff and jitter |
//! | [`routing`] | Source fallback chain |
//! | [`sources`] | Upstream quote source adapters |
//! | [`store`] | Realtime key-value store client |
//! | [`token`] | Rotating access credential |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tickersense_core::{QuoteRouter, ReqwestHttpClient, Ticker};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http = Arc::new(ReqwestHttpClient::new());
//!     let router = QuoteRouter::with_default_sources(http);
//!
//!     let ticker = Ticker::parse("BTC-USD").expect("valid ticker");
//!     match router.fetch(&ticker).await {
//!         Ok(success) => println!("{}: {}", ticker, success.quote.price),
//!         Err(miss) => println!("{}: no quote ({} sources tried)", ticker, miss.source_chain.len()),
//!     }
//! }
//! ```
//!
//! ## Error Handling
//!
//! Per-source failures are recoverable by design: the router records them
//! and falls through; only exhaustion of every applicable source yields a
//! miss. Store failures surface as [`store::StoreError`] and are expected
//! to be logged, never to abort an enclosing cycle or request.

pub mod domain;
pub mod error;
pub mod http_client;
pub mod retry;
pub mod routing;
pub mod sources;
pub mod store;
pub mod token;

// Re-export commonly used types at crate root for convenience

// Domain models
pub use domain::{AnalysisRecord, ChangePercent, Credential, Quote, Ticker, UtcTimestamp};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpClient, HttpError, HttpMethod, HttpRequest, HttpResponse, NoopHttpClient,
    ReqwestHttpClient, BROWSER_USER_AGENT,
};

// Retry logic
pub use retry::{Backoff, RetryConfig};

// Routing types
pub use routing::{FetchMiss, FetchResult, FetchSuccess, QuoteRouter};

// Source adapters
pub use sources::{
    ChartSource, CoinPriceSource, QuoteSource, QuoteSummarySource, SourceError, SourceErrorKind,
    SourceId,
};

// Store client
pub use store::{RealtimeStore, StoreError};

// Token authority
pub use token::TokenAuthority;
