//! Outcome classification for completion attempts.
//!
//! Every attempt against a candidate model collapses into a
//! [`CompletionOutcome`]. Nothing above this layer ever sees a raw provider
//! body or a transport error; the dispatcher decides purely on the variant
//! whether to stop or advance to the next candidate.

/// Substring OpenRouter embeds in upstream diagnostics when a free-tier
/// model is being throttled.
const RATE_LIMIT_MARKER: &str = "rate-limited";

/// Normalized result of one completion attempt against one candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The candidate produced a non-empty completion.
    Success { text: String },
    /// The candidate is temporarily unusable (rate limit, network fault,
    /// timeout); the next candidate may still answer.
    RetryableFailure { reason: String },
    /// Provider-reported error that switching candidates will not fix.
    FatalFailure { message: String },
    /// Body that is neither a usable completion nor a structured error.
    MalformedResponse,
}

/// Classify a raw response body.
///
/// The body is parsed the same way regardless of HTTP status: providers
/// report errors as structured JSON under varying status codes, and a 200
/// can still carry an error object.
#[must_use]
pub fn parse_response(raw: &str) -> CompletionOutcome {
    let Ok(body) = serde_json::from_str::<serde_json::Value>(raw) else {
        return CompletionOutcome::MalformedResponse;
    };

    if let Some(text) = body["choices"][0]["message"]["content"].as_str()
        && !text.is_empty()
    {
        return CompletionOutcome::Success { text: text.to_string() };
    }

    if let Some(error) = body.get("error") {
        if is_rate_limited(error) {
            return CompletionOutcome::RetryableFailure { reason: "rate-limited".into() };
        }
        let message = error
            .get("message")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("unknown provider error")
            .to_string();
        return CompletionOutcome::FatalFailure { message };
    }

    CompletionOutcome::MalformedResponse
}

/// A numeric 429 code, or an upstream diagnostic mentioning rate limiting,
/// means the candidate is throttled rather than broken.
fn is_rate_limited(error: &serde_json::Value) -> bool {
    if error.get("code").and_then(serde_json::Value::as_i64) == Some(429) {
        return true;
    }
    error["metadata"]["raw"]
        .as_str()
        .is_some_and(|raw| raw.contains(RATE_LIMIT_MARKER))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn parses_successful_completion() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":"hello there"}}]}"#;
        assert_eq!(
            parse_response(raw),
            CompletionOutcome::Success { text: "hello there".to_string() }
        );
    }

    #[test]
    fn classifies_rate_limit_by_error_code() {
        let raw = r#"{"error":{"code":429,"message":"Rate limit exceeded: free-models-per-day"}}"#;
        assert_eq!(
            parse_response(raw),
            CompletionOutcome::RetryableFailure { reason: "rate-limited".to_string() }
        );
    }

    #[test]
    fn classifies_rate_limit_by_upstream_diagnostic() {
        let raw = r#"{"error":{"code":503,"message":"Provider returned error","metadata":{"raw":"moonshotai/kimi-k2:free is temporarily rate-limited upstream"}}}"#;
        assert_eq!(
            parse_response(raw),
            CompletionOutcome::RetryableFailure { reason: "rate-limited".to_string() }
        );
    }

    #[test]
    fn non_429_error_is_fatal_with_provider_message() {
        let raw = r#"{"error":{"code":402,"message":"Insufficient credits"}}"#;
        assert_eq!(
            parse_response(raw),
            CompletionOutcome::FatalFailure { message: "Insufficient credits".to_string() }
        );
    }

    #[test]
    fn string_429_code_is_not_a_rate_limit() {
        // Only a numeric code counts; a quoted "429" is a provider quirk and
        // falls through to the fatal path.
        let raw = r#"{"error":{"code":"429","message":"Too many requests"}}"#;
        assert_eq!(
            parse_response(raw),
            CompletionOutcome::FatalFailure { message: "Too many requests".to_string() }
        );
    }

    #[test]
    fn error_without_message_gets_placeholder() {
        let raw = r#"{"error":{"code":500}}"#;
        assert_eq!(
            parse_response(raw),
            CompletionOutcome::FatalFailure { message: "unknown provider error".to_string() }
        );
    }

    #[test]
    fn non_json_body_is_malformed() {
        assert_eq!(parse_response("<html>502 Bad Gateway</html>"), CompletionOutcome::MalformedResponse);
    }

    #[test]
    fn empty_choices_is_malformed() {
        assert_eq!(parse_response(r#"{"choices":[]}"#), CompletionOutcome::MalformedResponse);
    }

    #[test]
    fn empty_content_is_malformed() {
        let raw = r#"{"choices":[{"message":{"role":"assistant","content":""}}]}"#;
        assert_eq!(parse_response(raw), CompletionOutcome::MalformedResponse);
    }

    #[test]
    fn content_wins_over_error_object() {
        // Some providers attach advisory error objects next to a usable
        // completion; the completion takes precedence.
        let raw = r#"{"choices":[{"message":{"content":"partial answer"}}],"error":{"code":429,"message":"slow down"}}"#;
        assert_eq!(
            parse_response(raw),
            CompletionOutcome::Success { text: "partial answer".to_string() }
        );
    }
}
