//! Chat Messages
//!
//! Standard inbound message format shared by transports and command handlers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Marker appended to text that had to be shortened for a transport limit
pub const TRUNCATION_MARKER: &str = "…";

/// A text message received from a chat user
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InboundMessage {
    /// Raw text as typed by the user
    pub text: String,

    /// Token used to answer this specific message (transport-specific)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_token: Option<String>,

    /// Sender identifier, when the transport exposes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<String>,

    /// When the message was received
    #[serde(default = "Utc::now")]
    pub received_at: DateTime<Utc>,
}

impl InboundMessage {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reply_token: None,
            sender_id: None,
            received_at: Utc::now(),
        }
    }

    pub fn with_reply_token(mut self, token: impl Into<String>) -> Self {
        self.reply_token = Some(token.into());
        self
    }

    pub fn with_sender(mut self, sender_id: impl Into<String>) -> Self {
        self.sender_id = Some(sender_id.into());
        self
    }

    /// Text with surrounding whitespace removed
    pub fn command_text(&self) -> &str {
        self.text.trim()
    }
}

/// Shorten `text` to at most `max_chars` characters, marking the cut.
///
/// Counts characters, not bytes, so multi-byte text is never split
/// inside a code point.
pub fn truncate_chars(text: &str, max_chars: usize) -> Cow<'_, str> {
    if text.chars().count() <= max_chars {
        return Cow::Borrowed(text);
    }

    let keep = max_chars.saturating_sub(TRUNCATION_MARKER.chars().count());
    let mut out: String = text.chars().take(keep).collect();
    out.push_str(TRUNCATION_MARKER);
    Cow::Owned(out)
}
