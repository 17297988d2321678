//! Fallback dispatch: one inbound message, one reply.
//!
//! Candidates are tried strictly in list order. The first success or fatal
//! provider error ends the walk; rate limits, network faults, and
//! unparseable bodies advance to the next candidate. Every dispatch starts
//! from the top of the list again — there is no cross-dispatch memory of
//! which candidates were recently throttled, so a model that recovers is
//! picked up immediately.

use std::sync::Arc;

use tracing::{debug, warn};

use banter_config::BanterConfig;

use crate::{client::CompletionBackend, model::ChatRequest, outcome::CompletionOutcome};

/// Marker prepended to every reply so clients can tell automated output
/// from user messages.
pub const REPLY_MARKER: &str = "\u{1F916} ";

/// Reply sent when every candidate was exhausted without a usable answer.
pub const NO_REPLY_SENTINEL: &str = "\u{1F916} Sorry, no reply.";

/// Walks an ordered candidate list until one model answers.
pub struct FallbackDispatcher {
    backend: Arc<dyn CompletionBackend>,
    candidates: Vec<String>,
    system_prompt: String,
    user_prefix: String,
}

impl FallbackDispatcher {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        candidates: Vec<String>,
        system_prompt: impl Into<String>,
        user_prefix: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            candidates,
            system_prompt: system_prompt.into(),
            user_prefix: user_prefix.into(),
        }
    }

    /// Build a dispatcher over `backend` from the configured model list and
    /// chat settings.
    pub fn from_config(config: &BanterConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        Self::new(
            backend,
            config.models.candidates.clone(),
            config.chat.system_prompt.clone(),
            config.chat.user_prefix.clone(),
        )
    }

    /// Handle one inbound message end to end and produce the single reply.
    ///
    /// Blank input short-circuits to a verbatim echo and never reaches any
    /// provider.
    pub async fn dispatch(&self, inbound: &str) -> String {
        if inbound.trim().is_empty() {
            return inbound.to_string();
        }

        let request = ChatRequest::new(self.system_prompt.as_str(), self.normalize(inbound));

        for candidate in &self.candidates {
            match self.backend.attempt(candidate, &request).await {
                CompletionOutcome::Success { text } => {
                    debug!(model = %candidate, "completion succeeded");
                    return format!("{REPLY_MARKER}{text}");
                },
                CompletionOutcome::FatalFailure { message } => {
                    warn!(model = %candidate, error = %message, "provider error, not retrying");
                    return format!("{REPLY_MARKER}Error: {message}");
                },
                CompletionOutcome::RetryableFailure { reason } => {
                    warn!(model = %candidate, reason = %reason, "candidate unavailable, trying next");
                },
                CompletionOutcome::MalformedResponse => {
                    warn!(model = %candidate, "unparseable response, trying next");
                },
            }
        }

        NO_REPLY_SENTINEL.to_string()
    }

    /// Strip the transport prefix when present; other messages pass through
    /// untouched.
    fn normalize<'a>(&self, inbound: &'a str) -> &'a str {
        if self.user_prefix.is_empty() {
            return inbound;
        }
        inbound
            .strip_prefix(&self.user_prefix)
            .map(str::trim_start)
            .unwrap_or(inbound)
    }
}
