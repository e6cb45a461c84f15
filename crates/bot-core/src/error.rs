//! Error Types

use thiserror::Error;

/// Result type alias for bot operations
pub type Result<T> = std::result::Result<T, BotError>;

/// Bot error types
#[derive(Error, Debug)]
pub enum BotError {
    /// A scheduled job reported a failure for one pass
    #[error("Scheduled job '{job}' failed: {message}")]
    Job { job: String, message: String },

    /// A scheduled job panicked or was aborted
    #[error("Scheduled job '{0}' aborted")]
    JobAborted(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BotError {
    /// Check if error is retryable on the next pass
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Job { .. } | Self::JobAborted(_))
    }

    /// Build a job failure from any displayable error
    pub fn job(job: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Job {
            job: job.into(),
            message: err.to_string(),
        }
    }
}
