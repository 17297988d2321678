//! Request types for OpenAI-compatible chat completion APIs.

// ── Chat messages ────────────────────────────────────────────────────────

/// A single message in the completion request payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    System { content: String },
    User { content: String },
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System { content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::User { content: content.into() }
    }

    /// Convert to the wire shape expected by `chat/completions`.
    #[must_use]
    pub fn to_openai_value(&self) -> serde_json::Value {
        match self {
            Self::System { content } => {
                serde_json::json!({ "role": "system", "content": content })
            },
            Self::User { content } => {
                serde_json::json!({ "role": "user", "content": content })
            },
        }
    }
}

// ── Completion request ───────────────────────────────────────────────────

/// One inbound message normalized for the upstream API.
///
/// Built once per dispatch; the same request is re-sent unchanged to every
/// candidate model in the fallback walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub system_prompt: String,
    pub user_text: String,
}

impl ChatRequest {
    pub fn new(system_prompt: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self { system_prompt: system_prompt.into(), user_text: user_text.into() }
    }

    /// The `messages` array for a `chat/completions` body.
    #[must_use]
    pub fn to_openai_messages(&self) -> Vec<serde_json::Value> {
        vec![
            ChatMessage::system(self.system_prompt.as_str()).to_openai_value(),
            ChatMessage::user(self.user_text.as_str()).to_openai_value(),
        ]
    }
}
