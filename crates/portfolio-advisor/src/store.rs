//! Portfolio Storage
//!
//! Loads the portfolio definition fresh on every call. Loading never fails:
//! a missing or malformed document degrades to an empty portfolio and the
//! problem is logged.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{AdvisorError, Result};
use crate::model::PortfolioDefinition;

/// Default document location
pub const DEFAULT_PORTFOLIO_PATH: &str = "stocks.json";

/// Storage backend for the portfolio definition
#[async_trait]
pub trait PortfolioStore: Send + Sync {
    /// Read and validate the stored document
    async fn try_load(&self) -> Result<PortfolioDefinition>;

    /// Replace the stored document
    async fn save(&self, definition: &PortfolioDefinition) -> Result<()>;

    /// Where the document lives (for logs)
    fn location(&self) -> String;

    /// Read the document, falling back to an empty portfolio on any error
    async fn load(&self) -> PortfolioDefinition {
        match self.try_load().await {
            Ok(definition) => {
                let invalid = definition.monitoring_rules.invalid_times();
                if !invalid.is_empty() {
                    tracing::warn!(
                        store = %self.location(),
                        times = ?invalid,
                        "Ignoring malformed notification times"
                    );
                }
                definition
            }
            Err(e) => {
                tracing::error!(
                    store = %self.location(),
                    "Failed to load portfolio, using an empty one: {}",
                    e
                );
                PortfolioDefinition::empty()
            }
        }
    }
}

/// JSON document on the local filesystem
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl PortfolioStore for JsonFileStore {
    async fn try_load(&self) -> Result<PortfolioDefinition> {
        let text = tokio::fs::read_to_string(&self.path).await?;
        PortfolioDefinition::from_json(&text)
    }

    async fn save(&self, definition: &PortfolioDefinition) -> Result<()> {
        definition.validate()?;
        let json = definition.to_json()?;

        // Write next to the target, then rename over it so readers never
        // see a half-written document.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::info!(
            path = %self.path.display(),
            holdings = definition.holding_count(),
            "Portfolio saved"
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory document, kept as raw JSON so it goes through the same
/// parsing path as a file
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<String>,
}

impl MemoryStore {
    pub fn from_json(document: impl Into<String>) -> Self {
        Self {
            document: RwLock::new(document.into()),
        }
    }
}

#[async_trait]
impl PortfolioStore for MemoryStore {
    async fn try_load(&self) -> Result<PortfolioDefinition> {
        let document = self
            .document
            .read()
            .map_err(|e| AdvisorError::InvalidPortfolio(e.to_string()))?;
        PortfolioDefinition::from_json(&document)
    }

    async fn save(&self, definition: &PortfolioDefinition) -> Result<()> {
        definition.validate()?;
        let json = definition.to_json()?;
        let mut document = self
            .document
            .write()
            .map_err(|e| AdvisorError::InvalidPortfolio(e.to_string()))?;
        *document = json;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".into()
    }
}
