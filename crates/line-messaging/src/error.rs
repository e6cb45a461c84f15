//! Messaging Error Types

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, MessagingError>;

/// LINE transport errors
#[derive(Error, Debug)]
pub enum MessagingError {
    /// `X-Line-Signature` missing or not matching the body
    #[error("Webhook signature invalid: {0}")]
    InvalidSignature(String),

    /// Webhook body is not a LINE webhook payload
    #[error("Webhook parse error: {0}")]
    WebhookParse(#[from] serde_json::Error),

    /// LINE API answered with a non-success status
    #[error("LINE API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// Request never got an answer
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Missing or invalid credentials
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MessagingError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Api { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Short text safe to return to an HTTP caller
    pub const fn user_message(&self) -> &str {
        match self {
            Self::InvalidSignature(_) => "Invalid signature.",
            Self::WebhookParse(_) => "Malformed webhook body.",
            Self::Config(_) => "Messaging is not configured.",
            Self::Api { .. } | Self::Network(_) => "Messaging service unavailable.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        let api = |status| MessagingError::Api {
            status,
            body: String::new(),
        };
        assert!(api(429).is_retryable());
        assert!(api(503).is_retryable());
        assert!(!api(400).is_retryable());
        assert!(!MessagingError::InvalidSignature("x".into()).is_retryable());
    }
}
