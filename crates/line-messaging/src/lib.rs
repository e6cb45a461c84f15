//! # line-messaging
//!
//! LINE Messaging API transport for the portfolio bot.
//!
//! ```text
//! LINE platform ──POST /callback──▶ SignatureVerifier ──▶ WebhookPayload
//!                                                          │ text events
//!                                                          ▼
//!                                                   InboundMessage ──▶ bot
//! bot ──Replier::reply─────▶ LineClient ──▶ /v2/bot/message/reply
//! bot ──Notifier::send──────▶ LineClient ──▶ /v2/bot/message/push
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use line_messaging::{LineClient, LineConfig, WebhookPayload};
//!
//! let client = LineClient::new(LineConfig::from_env()?)?;
//! client.verifier().verify(&body, signature)?;
//! for message in WebhookPayload::parse(&body)?.text_messages() {
//!     client.reply_text(message.reply_token.as_deref().unwrap_or_default(), "pong").await?;
//! }
//! ```

mod client;
mod error;
mod signature;
mod webhook;

pub use client::{DEFAULT_API_BASE, LineClient, LineConfig, MAX_TEXT_CHARS};
pub use error::{MessagingError, Result};
pub use signature::{SIGNATURE_HEADER, SignatureVerifier};
pub use webhook::{EventSource, MessageContent, WebhookEvent, WebhookPayload};
