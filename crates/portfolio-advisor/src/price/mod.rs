//! Price Sources
//!
//! Abstractions and implementations for live quote lookups.
//!
//! Two markets are supported, picked by the shape of the ticker:
//!
//! ```text
//! "2330", "0056"   ──▶ SymbolKind::Local   ──▶ TwseQuoteSource
//! "NVDA", "VOO"    ──▶ SymbolKind::Foreign ──▶ YahooQuoteSource
//! ```

mod static_source;
mod twse;
mod yahoo;

pub use static_source::StaticPriceSource;
pub use twse::TwseQuoteSource;
pub use yahoo::YahooQuoteSource;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

/// Outcome of a single quote lookup
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceQuote {
    /// A usable (positive) live price
    Found(Decimal),

    /// No price for this symbol right now
    Unavailable,
}

impl PriceQuote {
    /// Wrap a raw price; zero or negative prices count as unavailable
    pub fn from_price(price: Option<Decimal>) -> Self {
        match price {
            Some(p) if p > Decimal::ZERO => Self::Found(p),
            _ => Self::Unavailable,
        }
    }

    pub const fn price(&self) -> Option<Decimal> {
        match self {
            Self::Found(p) => Some(*p),
            Self::Unavailable => None,
        }
    }

    pub const fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }
}

/// Quote source trait (Strategy pattern)
///
/// Implementations swallow their own transport errors (logging them) and
/// report them as [`PriceQuote::Unavailable`].
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Current price for a symbol
    async fn lookup(&self, symbol: &str) -> PriceQuote;

    /// Source name
    fn name(&self) -> &str;
}

/// Market a ticker belongs to, judged by its shape
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    /// All-digit ticker (Taiwan listed/OTC)
    Local,
    /// Anything else (US style alphabetic symbol)
    Foreign,
}

impl SymbolKind {
    pub fn classify(symbol: &str) -> Self {
        if !symbol.is_empty() && symbol.chars().all(|c| c.is_ascii_digit()) {
            Self::Local
        } else {
            Self::Foreign
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Foreign => write!(f, "foreign"),
        }
    }
}

/// Routes each lookup to the source for the symbol's market
pub struct MarketRouter {
    local: Arc<dyn PriceSource>,
    foreign: Arc<dyn PriceSource>,
}

impl MarketRouter {
    pub fn new(local: Arc<dyn PriceSource>, foreign: Arc<dyn PriceSource>) -> Self {
        Self { local, foreign }
    }

    fn source_for(&self, symbol: &str) -> &Arc<dyn PriceSource> {
        match SymbolKind::classify(symbol) {
            SymbolKind::Local => &self.local,
            SymbolKind::Foreign => &self.foreign,
        }
    }
}

#[async_trait]
impl PriceSource for MarketRouter {
    async fn lookup(&self, symbol: &str) -> PriceQuote {
        let source = self.source_for(symbol);
        let quote = source.lookup(symbol).await;
        tracing::debug!(
            symbol = %symbol,
            market = %SymbolKind::classify(symbol),
            source = source.name(),
            found = quote.is_found(),
            "Quote lookup"
        );
        quote
    }

    fn name(&self) -> &str {
        "MarketRouter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_classify_symbols() {
        assert_eq!(SymbolKind::classify("2330"), SymbolKind::Local);
        assert_eq!(SymbolKind::classify("0056"), SymbolKind::Local);
        assert_eq!(SymbolKind::classify("NVDA"), SymbolKind::Foreign);
        assert_eq!(SymbolKind::classify("00632R"), SymbolKind::Foreign);
        assert_eq!(SymbolKind::classify(""), SymbolKind::Foreign);
    }

    #[test]
    fn test_non_positive_prices_are_unavailable() {
        assert_eq!(PriceQuote::from_price(Some(dec!(0))), PriceQuote::Unavailable);
        assert_eq!(PriceQuote::from_price(Some(dec!(-3))), PriceQuote::Unavailable);
        assert_eq!(PriceQuote::from_price(None), PriceQuote::Unavailable);
        assert_eq!(PriceQuote::from_price(Some(dec!(1.5))).price(), Some(dec!(1.5)));
    }

    #[tokio::test]
    async fn test_router_picks_market() {
        let local = Arc::new(StaticPriceSource::new().with_price("2330", dec!(585)));
        let foreign = Arc::new(StaticPriceSource::new().with_price("2330", dec!(1)).with_price("NVDA", dec!(120)));
        let router = MarketRouter::new(local, foreign);

        assert_eq!(router.lookup("2330").await, PriceQuote::Found(dec!(585)));
        assert_eq!(router.lookup("NVDA").await, PriceQuote::Found(dec!(120)));
        assert_eq!(router.lookup("AAPL").await, PriceQuote::Unavailable);
    }
}
