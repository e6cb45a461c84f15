//! LINE Webhook Payloads
//!
//! Only text messages are turned into [`InboundMessage`]s; follows, stickers,
//! postbacks and the like are logged and skipped.

use bot_core::InboundMessage;
use serde::Deserialize;

use crate::error::Result;

/// Webhook request body
#[derive(Clone, Debug, Deserialize)]
pub struct WebhookPayload {
    /// Bot user id the events were sent to
    #[serde(default)]
    pub destination: String,

    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum WebhookEvent {
    Message {
        #[serde(rename = "replyToken", default)]
        reply_token: Option<String>,

        #[serde(default)]
        source: Option<EventSource>,

        message: MessageContent,
    },

    /// Any event type we do not act on
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MessageContent {
    Text {
        #[serde(default)]
        id: String,
        text: String,
    },

    /// Images, stickers, locations, ...
    #[serde(other)]
    Other,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EventSource {
    /// "user", "group" or "room"
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(rename = "userId", default)]
    pub user_id: Option<String>,
}

impl WebhookPayload {
    pub fn parse(body: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Text messages in delivery order
    pub fn text_messages(&self) -> Vec<InboundMessage> {
        let mut messages = Vec::new();

        for event in &self.events {
            match event {
                WebhookEvent::Message {
                    reply_token,
                    source,
                    message: MessageContent::Text { text, .. },
                } => {
                    let mut inbound = InboundMessage::new(text.clone());
                    if let Some(token) = reply_token {
                        inbound = inbound.with_reply_token(token.clone());
                    }
                    if let Some(user_id) = source.as_ref().and_then(|s| s.user_id.clone()) {
                        inbound = inbound.with_sender(user_id);
                    }
                    messages.push(inbound);
                }
                WebhookEvent::Message { .. } => {
                    tracing::debug!("Ignoring non-text message event");
                }
                WebhookEvent::Other => {
                    tracing::debug!("Ignoring non-message webhook event");
                }
            }
        }

        messages
    }
}
