//! Error Types for Portfolio Advisor

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    #[error("Quote source error ({source_name}): {message}")]
    Quote {
        source_name: String,
        message: String,
    },

    #[error("Price unavailable for {0}")]
    PriceUnavailable(String),

    #[error("Invalid portfolio: {0}")]
    InvalidPortfolio(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AdvisorError {
    pub fn quote(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Quote {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    /// Check if a later attempt could succeed without a config change
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Quote { .. } | Self::PriceUnavailable(_) | Self::Network(_) | Self::Io(_)
        )
    }
}
