//! Static Price Source
//!
//! For testing and offline demo purposes. Returns fixed prices.

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::HashMap;

use super::{PriceQuote, PriceSource};

/// Quote source backed by a fixed table
#[derive(Clone, Debug, Default)]
pub struct StaticPriceSource {
    prices: HashMap<String, Decimal>,
}

impl StaticPriceSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Demo table used when `PRICE_SOURCE=static`
    pub fn demo() -> Self {
        Self::new()
            .with_price("NVDA", dec!(4156.75))
            .with_price("2330", dec!(585))
            .with_price("0050", dec!(142.5))
            .with_price("0056", dec!(36.45))
            .with_price("00878", dec!(21.32))
    }

    pub fn with_price(mut self, symbol: impl Into<String>, price: Decimal) -> Self {
        self.prices.insert(symbol.into(), price);
        self
    }
}

#[async_trait]
impl PriceSource for StaticPriceSource {
    async fn lookup(&self, symbol: &str) -> PriceQuote {
        PriceQuote::from_price(self.prices.get(symbol).copied())
    }

    fn name(&self) -> &str {
        "Static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_source() {
        let source = StaticPriceSource::demo();

        assert_eq!(source.lookup("NVDA").await, PriceQuote::Found(dec!(4156.75)));
        assert_eq!(source.lookup("nvda").await, PriceQuote::Unavailable);
    }

    #[tokio::test]
    async fn test_unknown_symbol() {
        let source = StaticPriceSource::new().with_price("ZERO", Decimal::ZERO);
        assert_eq!(source.lookup("NOTREAL").await, PriceQuote::Unavailable);
        assert_eq!(source.lookup("ZERO").await, PriceQuote::Unavailable);
    }
}
