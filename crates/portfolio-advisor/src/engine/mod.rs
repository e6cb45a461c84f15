//! Portfolio Engine
//!
//! Valuation, threshold alerts and rebalancing reports. Every entry point
//! takes a freshly loaded definition and re-queries live prices; nothing is
//! cached between calls.

mod alerts;
mod report;
mod valuation;

pub use alerts::{AlertDirection, AlertEvaluator, AlertRecord, combine_alerts};
pub use report::{RebalanceAction, Report, ReportGenerator, ReportLine, ReportSection};
pub use valuation::{
    CategoryValuation, DataWarning, HoldingValuation, PriceResolution, Valuation, ValuationEngine,
    WarningKind,
};

use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;

use crate::price::{PriceQuote, PriceSource};

/// Default upper bound for one quote lookup
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of one bounded live lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LiveLookup {
    Found(Decimal),
    Unavailable,
    TimedOut,
}

impl LiveLookup {
    pub const fn price(&self) -> Option<Decimal> {
        match self {
            Self::Found(p) => Some(*p),
            Self::Unavailable | Self::TimedOut => None,
        }
    }
}

/// Live quote access shared by the valuation and alert passes
///
/// Wraps a [`PriceSource`] with a per-call timeout so one hanging lookup
/// cannot stall a whole pass.
#[derive(Clone)]
pub struct PriceResolver {
    source: Arc<dyn PriceSource>,
    timeout: Duration,
}

impl PriceResolver {
    pub fn new(source: Arc<dyn PriceSource>, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    pub fn with_default_timeout(source: Arc<dyn PriceSource>) -> Self {
        Self::new(source, DEFAULT_LOOKUP_TIMEOUT)
    }

    /// One live lookup, bounded by the configured timeout
    pub async fn live(&self, symbol: &str) -> LiveLookup {
        match tokio::time::timeout(self.timeout, self.source.lookup(symbol)).await {
            Ok(PriceQuote::Found(price)) => LiveLookup::Found(price),
            Ok(PriceQuote::Unavailable) => LiveLookup::Unavailable,
            Err(_) => {
                tracing::warn!(
                    symbol = %symbol,
                    timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
                    source = self.source.name(),
                    "Quote lookup timed out"
                );
                LiveLookup::TimedOut
            }
        }
    }
}
