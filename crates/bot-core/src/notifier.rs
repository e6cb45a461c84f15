//! Notifier Strategy Pattern
//!
//! Defines a common interface for outbound delivery (LINE push, log sink, ...)
//! so the portfolio engine can notify the user without knowing the transport.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bot_core::Notifier;
//!
//! let notifier: Arc<dyn Notifier> = Arc::new(LineClient::new(config));
//! if !notifier.send("📊 status").await {
//!     // already logged by the implementation
//! }
//! ```

use async_trait::async_trait;
use std::sync::Mutex;

/// Outbound delivery channel
///
/// Implementations log their own failures and report them through the
/// return value; callers never see a delivery error as a fatal condition.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name (for logs)
    fn name(&self) -> &str;

    /// Deliver `text` to the configured recipient. Returns `true` on success.
    async fn send(&self, text: &str) -> bool;
}

/// Answers one specific inbound message
///
/// `reply_token` comes from the inbound message; like [`Notifier`], failures
/// are logged by the implementation and reported as `false`.
#[async_trait]
pub trait Replier: Send + Sync {
    async fn reply(&self, reply_token: &str, text: &str) -> bool;
}

/// Notifier that only writes to the log
///
/// Used when no messaging credentials are configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send(&self, text: &str) -> bool {
        tracing::info!(chars = text.chars().count(), "Notification (log only):\n{}", text);
        true
    }
}

/// Notifier that keeps every delivered message in memory
///
/// Handy for tests and dry runs; can be told to fail deliveries.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<String>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose deliveries always fail (nothing is recorded)
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Messages delivered so far
    pub fn sent(&self) -> Vec<String> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn name(&self) -> &str {
        "recording"
    }

    async fn send(&self, text: &str) -> bool {
        if self.fail {
            tracing::warn!(notifier = "recording", "Simulated delivery failure");
            return false;
        }
        match self.sent.lock() {
            Ok(mut sent) => {
                sent.push(text.to_string());
                true
            }
            Err(_) => false,
        }
    }
}

/// Replies are recorded like pushes (token is not kept)
#[async_trait]
impl Replier for RecordingNotifier {
    async fn reply(&self, _reply_token: &str, text: &str) -> bool {
        self.send(text).await
    }
}
