use std::sync::Arc;

use thiserror::Error;

use tickersense_core::http_client::{HttpClient, HttpRequest};
use tickersense_core::retry::RetryConfig;

use crate::wire::{GenerateContentRequest, GenerateContentResponse};

const UPSTREAM_DETAIL_LIMIT: usize = 400;

/// Failures surfaced by [`Summarizer::complete`].
///
/// Only `MissingApiKey` is a configuration error; everything else is an
/// expected upstream failure mode that the proxy route reports with the
/// upstream status and the cycle path converts to a placeholder.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("generative AI API key is not configured")]
    MissingApiKey,

    #[error("AI transport error: {0}")]
    Transport(String),

    #[error("AI upstream returned status {status}")]
    Upstream { status: u16, details: String },

    #[error("AI response carried no text content")]
    EmptyResponse,

    #[error("AI payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Client for the generative-AI sentiment endpoint.
pub struct Summarizer {
    http: Arc<dyn HttpClient>,
    base_url: String,
    model: String,
    api_key: Option<String>,
    retry: RetryConfig,
}

impl Summarizer {
    pub const DEFAULT_BASE_URL: &'static str = "https://generativelanguage.googleapis.com";
    pub const DEFAULT_MODEL: &'static str = "gemini-2.0-flash";

    pub fn new(http: Arc<dyn HttpClient>, api_key: Option<String>) -> Self {
        Self {
            http,
            base_url: String::from(Self::DEFAULT_BASE_URL),
            model: String::from(Self::DEFAULT_MODEL),
            api_key,
            retry: RetryConfig::ai_default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self, api_key: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url,
            self.model,
            urlencoding::encode(api_key)
        )
    }

    /// Fixed-template sentiment summary for the analysis cycle.
    ///
    /// Attaches the web-grounding tool, retries on failure or empty
    /// content per the configured policy, and degrades to a fixed
    /// "unavailable" message instead of surfacing an error.
    pub async fn summarize(&self, asset_name: &str, is_crypto: bool) -> String {
        let prompt = sentiment_prompt(asset_name, is_crypto);
        let mut attempt = 0;

        loop {
            match self.complete(&prompt, None).await {
                Ok(text) => return text,
                Err(error) => {
                    tracing::warn!(asset = asset_name, attempt, %error, "AI summary attempt failed");
                }
            }

            attempt += 1;
            if attempt >= self.retry.max_attempts {
                return unavailable_message(asset_name);
            }
            tokio::time::sleep(self.retry.backoff.delay(attempt - 1)).await;
        }
    }

    /// One generate-content call: the proxy path.
    ///
    /// # Errors
    ///
    /// [`AiError::MissingApiKey`] when the key is not configured, otherwise
    /// the upstream failure mode (transport, non-OK status with details,
    /// unparseable body, or empty candidates).
    pub async fn complete(
        &self,
        prompt: &str,
        schema: Option<serde_json::Value>,
    ) -> Result<String, AiError> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;

        let payload = GenerateContentRequest::for_prompt(prompt, schema);
        let request = HttpRequest::post(self.endpoint(api_key))
            .with_header("content-type", "application/json")
            .with_body(serde_json::to_string(&payload)?)
            .with_timeout_ms(30_000);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| AiError::Transport(e.message().to_owned()))?;

        if !response.is_success() {
            return Err(AiError::Upstream {
                status: response.status,
                details: truncate_details(&response.body),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&response.body)?;
        parsed.first_text().ok_or(AiError::EmptyResponse)
    }
}

fn sentiment_prompt(asset_name: &str, is_crypto: bool) -> String {
    if is_crypto {
        format!(
            "Give a summary of no more than two sentences describing current market \
             sentiment and volatility for the cryptocurrency {asset_name}."
        )
    } else {
        format!(
            "Give a summary of no more than two sentences describing current market \
             sentiment for the stock {asset_name}."
        )
    }
}

/// Placeholder returned when every attempt fails; callers never see an
/// error from the summarize path.
pub fn unavailable_message(asset_name: &str) -> String {
    format!("AI analysis is currently unavailable for {asset_name}.")
}

fn truncate_details(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.len() <= UPSTREAM_DETAIL_LIMIT {
        return trimmed.to_owned();
    }

    let mut cut = UPSTREAM_DETAIL_LIMIT;
    while !trimmed.is_char_boundary(cut) {
        cut -= 1;
    }
    trimmed[..cut].to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;
    use tickersense_core::http_client::{HttpError, HttpResponse};

    struct ScriptedHttpClient {
        responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedHttpClient {
        fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(
            &'a self,
            request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            self.requests.lock().unwrap().push(request);
            let mut responses = self.responses.lock().unwrap();
            let response = if responses.is_empty() {
                Err(HttpError::new("script exhausted"))
            } else {
                responses.remove(0)
            };
            Box::pin(async move { response })
        }
    }

    fn candidate_body(text: &str) -> String {
        format!(r#"{{"candidates":[{{"content":{{"parts":[{{"text":"{text}"}}]}}}}]}}"#)
    }

    #[tokio::test]
    async fn complete_extracts_first_text() {
        let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::ok_json(candidate_body(
            "Sentiment is cautiously optimistic.",
        )))]);
        let summarizer = Summarizer::new(client.clone(), Some(String::from("test-key")));

        let text = summarizer.complete("prompt", None).await.expect("must succeed");
        assert_eq!(text, "Sentiment is cautiously optimistic.");

        let requests = client.requests.lock().unwrap();
        assert!(requests[0].url.contains(":generateContent?key=test-key"));
        assert!(requests[0].body.as_deref().unwrap().contains("google_search"));
    }

    #[tokio::test]
    async fn complete_without_key_is_a_configuration_error() {
        let client = ScriptedHttpClient::new(vec![]);
        let summarizer = Summarizer::new(client.clone(), None);

        let error = summarizer.complete("prompt", None).await.expect_err("must fail");
        assert!(matches!(error, AiError::MissingApiKey));
        assert_eq!(client.request_count(), 0, "no upstream call without a key");
    }

    #[tokio::test]
    async fn complete_surfaces_upstream_status() {
        let client = ScriptedHttpClient::new(vec![Ok(HttpResponse::with_status(
            429,
            r#"{"error":"quota exceeded"}"#,
        ))]);
        let summarizer = Summarizer::new(client, Some(String::from("test-key")));

        let error = summarizer.complete("prompt", None).await.expect_err("must fail");
        match error {
            AiError::Upstream { status, details } => {
                assert_eq!(status, 429);
                assert!(details.contains("quota exceeded"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn summarize_retries_then_falls_back_to_placeholder() {
        let client = ScriptedHttpClient::new(vec![
            Err(HttpError::new("connection reset")),
            Ok(HttpResponse::with_status(500, "oops")),
            Ok(HttpResponse::ok_json("{}")),
        ]);
        let summarizer = Summarizer::new(client.clone(), Some(String::from("test-key")))
            .with_retry(RetryConfig {
                max_attempts: 3,
                backoff: tickersense_core::Backoff::Fixed {
                    delay: std::time::Duration::ZERO,
                },
            });

        let text = summarizer.summarize("Bitcoin", true).await;
        assert_eq!(text, unavailable_message("Bitcoin"));
        assert_eq!(client.request_count(), 3, "all attempts consumed");
    }

    #[tokio::test]
    async fn summarize_recovers_on_a_later_attempt() {
        let client = ScriptedHttpClient::new(vec![
            Ok(HttpResponse::ok_json("{}")),
            Ok(HttpResponse::ok_json(candidate_body("Volatility is easing."))),
        ]);
        let summarizer = Summarizer::new(client, Some(String::from("test-key")))
            .with_retry(RetryConfig {
                max_attempts: 3,
                backoff: tickersense_core::Backoff::Fixed {
                    delay: std::time::Duration::ZERO,
                },
            });

        let text = summarizer.summarize("Bitcoin", true).await;
        assert_eq!(text, "Volatility is easing.");
    }

    #[tokio::test]
    async fn crypto_prompts_mention_volatility() {
        let crypto = sentiment_prompt("Bitcoin", true);
        assert!(crypto.contains("volatility"));
        assert!(crypto.contains("cryptocurrency Bitcoin"));

        let equity = sentiment_prompt("Bank Central Asia", false);
        assert!(!equity.contains("volatility"));
        assert!(equity.contains("stock Bank Central Asia"));
    }
}
