//! Advisor configuration from environment variables

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::engine::DEFAULT_LOOKUP_TIMEOUT;
use crate::error::{AdvisorError, Result};
use crate::price::{MarketRouter, PriceSource, StaticPriceSource, TwseQuoteSource, YahooQuoteSource};
use crate::store::DEFAULT_PORTFOLIO_PATH;

/// Which quotes to use
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PriceSourceMode {
    /// TWSE for numeric tickers, Yahoo for everything else
    #[default]
    Live,
    /// Fixed demo table, no network
    Static,
}

impl std::str::FromStr for PriceSourceMode {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "live" => Ok(Self::Live),
            "static" => Ok(Self::Static),
            other => Err(AdvisorError::Config(format!(
                "PRICE_SOURCE must be 'live' or 'static', got '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdvisorConfig {
    /// Portfolio document location
    pub portfolio_path: PathBuf,

    /// Upper bound for a single quote lookup
    pub lookup_timeout: Duration,

    pub price_source: PriceSourceMode,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            portfolio_path: PathBuf::from(DEFAULT_PORTFOLIO_PATH),
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
            price_source: PriceSourceMode::default(),
        }
    }
}

impl AdvisorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source
    ///
    /// Reads `PORTFOLIO_PATH`, `PRICE_LOOKUP_TIMEOUT_SECS` and `PRICE_SOURCE`;
    /// unset variables keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("PORTFOLIO_PATH").filter(|p| !p.trim().is_empty()) {
            config.portfolio_path = PathBuf::from(path.trim());
        }

        if let Some(raw) = lookup("PRICE_LOOKUP_TIMEOUT_SECS") {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                AdvisorError::Config(format!("PRICE_LOOKUP_TIMEOUT_SECS must be a number, got '{raw}'"))
            })?;
            if secs == 0 {
                return Err(AdvisorError::Config(
                    "PRICE_LOOKUP_TIMEOUT_SECS must be greater than zero".into(),
                ));
            }
            config.lookup_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("PRICE_SOURCE") {
            config.price_source = raw.parse()?;
        }

        Ok(config)
    }

    /// Build the quote source this configuration asks for
    pub fn build_price_source(&self) -> Result<Arc<dyn PriceSource>> {
        match self.price_source {
            PriceSourceMode::Static => Ok(Arc::new(StaticPriceSource::demo())),
            PriceSourceMode::Live => {
                let local = Arc::new(TwseQuoteSource::new(self.lookup_timeout)?);
                let foreign = Arc::new(YahooQuoteSource::new(self.lookup_timeout)?);
                Ok(Arc::new(MarketRouter::new(local, foreign)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).into(), (*v).into())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AdvisorConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AdvisorConfig::default());
        assert_eq!(config.portfolio_path, PathBuf::from("stocks.json"));
        assert_eq!(config.lookup_timeout, Duration::from_secs(10));
        assert_eq!(config.price_source, PriceSourceMode::Live);
    }

    #[test]
    fn test_overrides() {
        let config = AdvisorConfig::from_lookup(lookup(&[
            ("PORTFOLIO_PATH", "/data/portfolio.json"),
            ("PRICE_LOOKUP_TIMEOUT_SECS", "3"),
            ("PRICE_SOURCE", "Static"),
        ]))
        .unwrap();

        assert_eq!(config.portfolio_path, PathBuf::from("/data/portfolio.json"));
        assert_eq!(config.lookup_timeout, Duration::from_secs(3));
        assert_eq!(config.price_source, PriceSourceMode::Static);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(AdvisorConfig::from_lookup(lookup(&[("PRICE_LOOKUP_TIMEOUT_SECS", "0")])).is_err());
        assert!(AdvisorConfig::from_lookup(lookup(&[("PRICE_LOOKUP_TIMEOUT_SECS", "soon")])).is_err());
        assert!(matches!(
            AdvisorConfig::from_lookup(lookup(&[("PRICE_SOURCE", "mock")])),
            Err(AdvisorError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_static_mode_builds_demo_source() {
        let config = AdvisorConfig {
            price_source: PriceSourceMode::Static,
            ..AdvisorConfig::default()
        };
        let source = config.build_price_source().unwrap();
        assert_eq!(source.name(), "Static");
        assert!(source.lookup("NVDA").await.is_found());
    }
}
