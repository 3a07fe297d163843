//! Realtime key-value store client.
//!
//! The store is an external REST-compatible service: every hierarchical key
//! maps to `{base}/{path}.json`, readable with GET (a literal `null` body
//! means absent), writable with PUT, and removable with DELETE.

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::http_client::{HttpClient, HttpRequest};

/// Store operation failures. Always non-fatal to the caller's enclosing
/// cycle or request; callers log and continue.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store transport error: {0}")]
    Transport(String),

    #[error("store returned status {status} for '{path}'")]
    Status { status: u16, path: String },

    #[error("store payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Client handle for the remote realtime store. Cheap to clone.
#[derive(Clone)]
pub struct RealtimeStore {
    base_url: String,
    http: Arc<dyn HttpClient>,
}

impl RealtimeStore {
    pub fn new(http: Arc<dyn HttpClient>, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_owned();
        Self { base_url, http }
    }

    fn key_url(&self, path: &str) -> String {
        format!("{}/{}.json", self.base_url, path.trim_matches('/'))
    }

    /// Read the value at `path`. `Ok(None)` means the key is absent.
    pub async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .http
            .execute(HttpRequest::get(self.key_url(path)))
            .await
            .map_err(|e| StoreError::Transport(e.message().to_owned()))?;

        if !response.is_success() {
            return Err(StoreError::Status {
                status: response.status,
                path: path.to_owned(),
            });
        }

        let body = response.body.trim();
        if body.is_empty() || body == "null" {
            return Ok(None);
        }

        let value: Value = serde_json::from_str(body)?;
        Ok(match value {
            Value::Null => None,
            value => Some(value),
        })
    }

    /// Write `value` at `path`, unconditionally overwriting any prior
    /// value. Last writer wins.
    pub async fn set<T>(&self, path: &str, value: &T) -> Result<(), StoreError>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_string(value)?;
        let request = HttpRequest::put(self.key_url(path))
            .with_header("content-type", "application/json")
            .with_body(body);

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|e| StoreError::Transport(e.message().to_owned()))?;

        if !response.is_success() {
            return Err(StoreError::Status {
                status: response.status,
                path: path.to_owned(),
            });
        }

        Ok(())
    }

    /// Delete the value at `path`. Deleting an absent key succeeds.
    pub async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let response = self
            .http
            .execute(HttpRequest::delete(self.key_url(path)))
            .await
            .map_err(|e| StoreError::Transport(e.message().to_owned()))?;

        if !response.is_success() {
            return Err(StoreError::Status {
                status: response.status,
                path: path.to_owned(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{HttpError, HttpMethod, HttpResponse, NoopHttpClient};
    use std::future::Future;
    use std::pin::Pin;
    use std::sync::Mutex;

    struct RecordingHttpClient {
        response: Result<HttpResponse, HttpError>,
        requests: Mutex<Vec<HttpRequest>>,
    }

    impl RecordingHttpClient {
        fn with_body(body: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(HttpResponse::ok_json(body)),
                requests: Mutex::new(Vec::new()),
            })
        }

        fn last_request(&self) -> HttpRequest {
            self.requests
                .lock()
                .expect("request store should not be poisoned")
                .last()
                .cloned()
                .expect("a request was recorded")
        }
    }

    impl HttpClient for RecordingHttpClient {
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
    async fn get_maps_null_body_to_absent() {
        let store = RealtimeStore::new(
            RecordingHttpClient::with_body("null"),
            "https://store.test",
        );

        let value = store.get("tokens/123456").await.expect("get should succeed");
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn set_puts_json_at_suffixed_path() {
        let client = RecordingHttpClient::with_body("{}");
        let store = RealtimeStore::new(client.clone(), "https://store.test/");

        store
            .set("analysis/BTC_USD", &serde_json::json!({ "price": 50000.0 }))
            .await
            .expect("set should succeed");

        let request = client.last_request();
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(request.url, "https://store.test/analysis/BTC_USD.json");
        assert_eq!(request.body.as_deref(), Some("{\"price\":50000.0}"));
    }

    #[tokio::test]
    async fn remove_issues_delete() {
        let client = RecordingHttpClient::with_body("null");
        let store = RealtimeStore::new(client.clone(), "https://store.test");

        store.remove("tokens/654321").await.expect("remove should succeed");
        assert_eq!(client.last_request().method, HttpMethod::Delete);
    }

    #[tokio::test]
    async fn noop_client_round_trips_empty_object() {
        let store = RealtimeStore::new(Arc::new(NoopHttpClient), "https://store.test");
        let value = store.get("anything").await.expect("get should succeed");
        assert_eq!(value, Some(serde_json::json!({})));
    }
}
