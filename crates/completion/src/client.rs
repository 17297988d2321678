//! HTTP client for OpenAI-compatible `chat/completions` endpoints.

use std::time::Duration;

use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, warn},
};

use banter_config::ProviderConfig;

use crate::{
    model::ChatRequest,
    outcome::{CompletionOutcome, parse_response},
};

/// One attempt against one candidate model.
///
/// Implementations must fold every failure mode into a
/// [`CompletionOutcome`]; `attempt` itself cannot fail.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn attempt(&self, candidate: &str, request: &ChatRequest) -> CompletionOutcome;
}

/// Completion client for an OpenAI-compatible HTTP API such as OpenRouter.
pub struct HttpCompletionClient {
    base_url: String,
    api_key: Option<Secret<String>>,
    timeout: Duration,
    client: &'static reqwest::Client,
}

impl HttpCompletionClient {
    #[must_use]
    pub fn new(base_url: &str, api_key: Option<Secret<String>>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout,
            client: crate::shared_http_client(),
        }
    }

    /// Build a client from the `[provider]` config section, resolving the
    /// API key from config or environment.
    #[must_use]
    pub fn from_config(provider: &ProviderConfig) -> Self {
        Self::new(
            &provider.base_url,
            provider.resolve_api_key(),
            Duration::from_secs(provider.timeout_secs),
        )
    }
}

#[async_trait]
impl CompletionBackend for HttpCompletionClient {
    async fn attempt(&self, candidate: &str, request: &ChatRequest) -> CompletionOutcome {
        let body = serde_json::json!({
            "model": candidate,
            "messages": request.to_openai_messages(),
        });

        debug!(model = %candidate, "sending completion request");

        let mut req = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .timeout(self.timeout)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", format!("Bearer {}", key.expose_secret()));
        }

        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(e) => {
                let reason = if e.is_timeout() { "timeout" } else { "network" };
                warn!(model = %candidate, error = %e, reason, "completion request failed");
                return CompletionOutcome::RetryableFailure { reason: reason.to_string() };
            },
        };

        let status = resp.status();
        let raw = match resp.text().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(model = %candidate, error = %e, "failed to read response body");
                return CompletionOutcome::RetryableFailure { reason: "network".to_string() };
            },
        };

        // Per-attempt diagnostic; only the classified outcome reaches users.
        debug!(model = %candidate, status = %status, body = %raw, "completion raw response");

        parse_response(&raw)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use std::sync::{Arc, Mutex};

    use axum::{Router, extract::Request, routing::post};

    use super::*;

    #[derive(Default, Clone)]
    struct CapturedRequest {
        authorization: Option<String>,
        body: Option<serde_json::Value>,
    }

    /// Start a mock completion endpoint that captures each request and
    /// answers with a fixed status and payload.
    async fn start_completion_mock(
        status: http::StatusCode,
        payload: &str,
    ) -> (String, Arc<Mutex<Vec<CapturedRequest>>>) {
        let captured: Arc<Mutex<Vec<CapturedRequest>>> = Arc::new(Mutex::new(Vec::new()));
        let captured_clone = captured.clone();
        let payload = payload.to_string();

        let app = Router::new().route(
            "/chat/completions",
            post(move |req: Request| {
                let captured = captured_clone.clone();
                let payload = payload.clone();
                async move {
                    let authorization = req
                        .headers()
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    let bytes = axum::body::to_bytes(req.into_body(), 1024 * 1024)
                        .await
                        .unwrap_or_default();
                    let body = serde_json::from_slice(&bytes).ok();
                    captured.lock().unwrap().push(CapturedRequest { authorization, body });

                    axum::response::Response::builder()
                        .status(status)
                        .header("content-type", "application/json")
                        .body(axum::body::Body::from(payload))
                        .unwrap()
                }
            }),
        );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{addr}"), captured)
    }

    fn test_client(base_url: &str) -> HttpCompletionClient {
        HttpCompletionClient::new(
            base_url,
            Some(Secret::new("test-key".to_string())),
            Duration::from_secs(5),
        )
    }

    fn sample_request() -> ChatRequest {
        ChatRequest::new("You are a helpful assistant.", "say hi")
    }

    #[tokio::test]
    async fn sends_model_messages_and_bearer_token() {
        let payload = r#"{"choices":[{"message":{"role":"assistant","content":"hi"}}]}"#;
        let (base_url, captured) = start_completion_mock(http::StatusCode::OK, payload).await;

        let outcome = test_client(&base_url)
            .attempt("moonshotai/kimi-k2:free", &sample_request())
            .await;
        assert_eq!(outcome, CompletionOutcome::Success { text: "hi".to_string() });

        let requests = captured.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].authorization.as_deref(), Some("Bearer test-key"));

        let body = requests[0].body.as_ref().expect("request should carry a JSON body");
        assert_eq!(body["model"], "moonshotai/kimi-k2:free");
        let messages = body["messages"].as_array().expect("messages should be an array");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "say hi");
    }

    #[tokio::test]
    async fn omits_authorization_header_without_key() {
        let payload = r#"{"error":{"code":401,"message":"No auth credentials found"}}"#;
        let (base_url, captured) = start_completion_mock(http::StatusCode::UNAUTHORIZED, payload).await;

        let client = HttpCompletionClient::new(&base_url, None, Duration::from_secs(5));
        let outcome = client.attempt("m", &sample_request()).await;

        assert_eq!(
            outcome,
            CompletionOutcome::FatalFailure { message: "No auth credentials found".to_string() }
        );
        assert!(captured.lock().unwrap()[0].authorization.is_none());
    }

    #[tokio::test]
    async fn classifies_body_regardless_of_http_status() {
        let payload = r#"{"error":{"code":429,"message":"Rate limit exceeded: free-models-per-day"}}"#;
        let (base_url, _) = start_completion_mock(http::StatusCode::TOO_MANY_REQUESTS, payload).await;

        let outcome = test_client(&base_url).attempt("m", &sample_request()).await;
        assert_eq!(
            outcome,
            CompletionOutcome::RetryableFailure { reason: "rate-limited".to_string() }
        );
    }

    #[tokio::test]
    async fn html_error_page_is_malformed() {
        let (base_url, _) =
            start_completion_mock(http::StatusCode::BAD_GATEWAY, "<html>502 Bad Gateway</html>").await;

        let outcome = test_client(&base_url).attempt("m", &sample_request()).await;
        assert_eq!(outcome, CompletionOutcome::MalformedResponse);
    }

    #[tokio::test]
    async fn connection_refused_is_retryable_network_failure() {
        // Bind then drop a listener to get a port with nothing behind it.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let outcome = test_client(&format!("http://{addr}")).attempt("m", &sample_request()).await;
        assert_eq!(
            outcome,
            CompletionOutcome::RetryableFailure { reason: "network".to_string() }
        );
    }

    #[tokio::test]
    async fn slow_upstream_times_out_as_retryable() {
        let app = Router::new().route(
            "/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                "{}"
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client =
            HttpCompletionClient::new(&format!("http://{addr}"), None, Duration::from_millis(100));
        let outcome = client.attempt("m", &sample_request()).await;
        assert_eq!(
            outcome,
            CompletionOutcome::RetryableFailure { reason: "timeout".to_string() }
        );
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_tolerated() {
        let payload = r#"{"choices":[{"message":{"content":"ok"}}]}"#;
        let (base_url, captured) = start_completion_mock(http::StatusCode::OK, payload).await;

        let outcome = test_client(&format!("{base_url}/")).attempt("m", &sample_request()).await;
        assert_eq!(outcome, CompletionOutcome::Success { text: "ok".to_string() });
        assert_eq!(captured.lock().unwrap().len(), 1);
    }
}
