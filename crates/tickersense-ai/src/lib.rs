//! Generative-AI sentiment summarizer.
//!
//! Builds fixed-template prompts per asset class, talks to the upstream
//! generate-content endpoint, and extracts the first text fragment from the
//! nested candidate structure. Two entry points with different failure
//! contracts:
//!
//! - [`Summarizer::summarize`] - the analysis-cycle path. Bounded retry with
//!   backoff; every expected failure degrades to a fixed placeholder string.
//! - [`Summarizer::complete`] - the proxy path. Surfaces upstream failures
//!   as [`AiError`] so the HTTP layer can relay the upstream status.
//!
//! Structured output (a caller-supplied JSON schema) and the web-grounding
//! tool are mutually exclusive on the upstream API; request construction in
//! [`wire`] enforces that.

pub mod summarizer;
pub mod wire;

pub use summarizer::{unavailable_message, AiError, Summarizer};
pub use wire::{GenerateContentRequest, GenerateContentResponse};
