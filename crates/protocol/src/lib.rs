//! Chat gateway WebSocket protocol definitions.
//!
//! Protocol version 1. All communication uses JSON frames over WebSocket.
//!
//! Frame types:
//! - `ClientFrame` — client → gateway (chat messages)
//! - `ServerFrame` — gateway → client (chat replies, lifecycle notices)

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

pub const PROTOCOL_VERSION: u32 = 1;
pub const MAX_PAYLOAD_BYTES: usize = 65_536; // 64 KB

// ── Frames ───────────────────────────────────────────────────────────────────

/// Client → gateway frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientFrame {
    /// A chat message to be answered (or echoed, if blank).
    Chat { text: String },
}

impl ClientFrame {
    /// Parse a raw WebSocket text payload into a frame.
    ///
    /// Enforces [`MAX_PAYLOAD_BYTES`] on the raw payload before touching the
    /// JSON parser, so oversized garbage is rejected cheaply.
    pub fn parse(raw: &str) -> Result<Self, FrameError> {
        if raw.len() > MAX_PAYLOAD_BYTES {
            return Err(FrameError::Oversized { len: raw.len() });
        }
        Ok(serde_json::from_str(raw)?)
    }
}

/// Gateway → client frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerFrame {
    /// A chat line: either an echoed message or an assistant reply.
    Chat { text: String },
    /// Connection lifecycle notice (join/leave, rejected input).
    System { text: String },
}

impl ServerFrame {
    pub fn chat(text: impl Into<String>) -> Self {
        Self::Chat { text: text.into() }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::System { text: text.into() }
    }

    /// Serialize for the wire. Frames are plain data; serialization cannot
    /// fail for any value constructible through the public API.
    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("frame exceeds {MAX_PAYLOAD_BYTES} bytes (got {len})")]
    Oversized { len: usize },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn parses_chat_frame() {
        let frame = ClientFrame::parse(r#"{"type":"chat","text":"user: hi"}"#).unwrap();
        let ClientFrame::Chat { text } = frame;
        assert_eq!(text, "user: hi");
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(matches!(
            ClientFrame::parse(r#"{"type":"rpc","text":"x"}"#),
            Err(FrameError::Json(_))
        ));
    }

    #[test]
    fn rejects_oversized_payload() {
        let big = format!(r#"{{"type":"chat","text":"{}"}}"#, "x".repeat(MAX_PAYLOAD_BYTES));
        assert!(matches!(
            ClientFrame::parse(&big),
            Err(FrameError::Oversized { .. })
        ));
    }

    #[test]
    fn server_frame_wire_shape() {
        let json = ServerFrame::chat("🤖 hello").to_json();
        assert_eq!(json, r#"{"type":"chat","text":"🤖 hello"}"#);

        let json = ServerFrame::system("a user joined").to_json();
        assert_eq!(json, r#"{"type":"system","text":"a user joined"}"#);
    }
}
