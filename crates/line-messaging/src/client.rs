//! LINE Messaging API client
//!
//! Push and reply text messages. Implements [`Notifier`] by pushing to the
//! configured user and [`Replier`] through the reply endpoint.

use async_trait::async_trait;
use bot_core::{Notifier, Replier};
use bot_core::message::truncate_chars;
use serde::Serialize;
use std::time::Duration;

use crate::error::{MessagingError, Result};
use crate::signature::SignatureVerifier;

pub const DEFAULT_API_BASE: &str = "https://api.line.me";

/// Longest text a single LINE text message may carry
pub const MAX_TEXT_CHARS: usize = 5000;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Channel credentials and push recipient
#[derive(Clone)]
pub struct LineConfig {
    pub channel_secret: String,
    pub channel_access_token: String,
    /// Recipient of pushed notifications
    pub user_id: String,
    pub api_base: String,
}

impl std::fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfig")
            .field("user_id", &self.user_id)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl LineConfig {
    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| MessagingError::Config(format!("{key} not set")))
        };

        Ok(Self {
            channel_secret: required("LINE_CHANNEL_SECRET")?,
            channel_access_token: required("LINE_CHANNEL_ACCESS_TOKEN")?,
            user_id: required("LINE_USER_ID")?,
            api_base: lookup("LINE_API_BASE")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_API_BASE.into()),
        })
    }
}

#[derive(Serialize)]
struct TextMessage<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: [TextMessage<'a>; 1],
}

#[derive(Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: [TextMessage<'a>; 1],
}

/// LINE API client
pub struct LineClient {
    http: reqwest::Client,
    config: LineConfig,
    verifier: SignatureVerifier,
}

impl LineClient {
    pub fn new(config: LineConfig) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        let verifier = SignatureVerifier::new(&config.channel_secret);
        Ok(Self {
            http,
            config,
            verifier,
        })
    }

    pub const fn verifier(&self) -> &SignatureVerifier {
        &self.verifier
    }

    /// Answer one inbound message
    pub async fn reply_text(&self, reply_token: &str, text: &str) -> Result<()> {
        let text = truncate_chars(text, MAX_TEXT_CHARS);
        let body = ReplyRequest {
            reply_token,
            messages: [TextMessage { kind: "text", text: &text }],
        };
        self.post("/v2/bot/message/reply", &body).await
    }

    /// Send a message to `to` without a reply token
    pub async fn push_text(&self, to: &str, text: &str) -> Result<()> {
        let text = truncate_chars(text, MAX_TEXT_CHARS);
        let body = PushRequest {
            to,
            messages: [TextMessage { kind: "text", text: &text }],
        };
        self.post("/v2/bot/message/push", &body).await
    }

    async fn post<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<()> {
        let url = format!("{}{}", self.config.api_base.trim_end_matches('/'), path);
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.config.channel_access_token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MessagingError::Api {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Notifier for LineClient {
    fn name(&self) -> &str {
        "line"
    }

    async fn send(&self, text: &str) -> bool {
        match self.push_text(&self.config.user_id, text).await {
            Ok(()) => {
                tracing::info!(chars = text.chars().count(), "LINE push delivered");
                true
            }
            Err(e) => {
                tracing::warn!(retryable = e.is_retryable(), "LINE push failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl Replier for LineClient {
    async fn reply(&self, reply_token: &str, text: &str) -> bool {
        match self.reply_text(reply_token, text).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(retryable = e.is_retryable(), "LINE reply failed: {}", e);
                false
            }
        }
    }
}
