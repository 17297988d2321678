//! Completion dispatch for the chat gateway.
//!
//! This crate owns the path from one inbound chat message to one reply
//! string: request shaping ([`model`]), response classification
//! ([`outcome`]), the HTTP client for OpenAI-compatible APIs ([`client`]),
//! and the fallback walk across candidate models ([`dispatch`]).

use std::sync::OnceLock;

pub mod client;
pub mod dispatch;
pub mod model;
pub mod outcome;

pub use {
    client::{CompletionBackend, HttpCompletionClient},
    dispatch::{FallbackDispatcher, NO_REPLY_SENTINEL, REPLY_MARKER},
    model::{ChatMessage, ChatRequest},
    outcome::CompletionOutcome,
};

/// Process-wide HTTP client, shared across attempts for connection reuse.
pub(crate) fn shared_http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}
