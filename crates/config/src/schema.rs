//! Config schema types (server, upstream provider, chat behavior, models).

use {
    secrecy::{ExposeSecret, Secret},
    serde::{Deserialize, Serialize},
};

/// Environment variable consulted when `[provider] api_key` is not set.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BanterConfig {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub chat: ChatConfig,
    pub models: ModelsConfig,
}

/// Gateway server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to. Defaults to "127.0.0.1".
    pub bind: String,
    /// Port to listen on. Defaults to 3000.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 3000,
        }
    }
}

/// Upstream completion provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// Base URL of the OpenAI-compatible completion API.
    pub base_url: String,
    /// API key (overrides the `OPENROUTER_API_KEY` env var).
    #[serde(
        default,
        serialize_with = "serialize_option_secret",
        skip_serializing_if = "Option::is_none"
    )]
    pub api_key: Option<Secret<String>>,
    /// Per-attempt HTTP timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://openrouter.ai/api/v1".into(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl ProviderConfig {
    /// Resolve the API key from config or the `OPENROUTER_API_KEY` environment
    /// variable, keeping the value wrapped in `Secret<String>` to avoid
    /// leaking it.
    pub fn resolve_api_key(&self) -> Option<Secret<String>> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(API_KEY_ENV).ok().map(Secret::new))
            .filter(|s| !s.expose_secret().is_empty())
    }
}

/// Chat behavior configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// System prompt sent with every completion request.
    pub system_prompt: String,
    /// Transport prefix stripped from inbound messages when present.
    pub user_prefix: String,
    /// Where assistant replies are delivered.
    pub reply: ReplyMode,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are a helpful assistant.".into(),
            user_prefix: "user:".into(),
            reply: ReplyMode::default(),
        }
    }
}

/// Reply routing policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyMode {
    /// Reply only to the connection that sent the message.
    #[default]
    Origin,
    /// Relay the reply to every connected client.
    Broadcast,
}

/// Candidate model list for fallback dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Ordered list of model IDs; earlier entries are tried first.
    pub candidates: Vec<String>,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            candidates: vec![
                "moonshotai/kimi-k2:free".into(),
                "mistralai/mistral-7b-instruct:free".into(),
                "google/gemma-7b-it:free".into(),
            ],
        }
    }
}

// ── Serde helpers for Secret<String> ────────────────────────────────────────

fn serialize_option_secret<S: serde::Serializer>(
    secret: &Option<Secret<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match secret {
        Some(s) => serializer.serialize_some(s.expose_secret()),
        None => serializer.serialize_none(),
    }
}
