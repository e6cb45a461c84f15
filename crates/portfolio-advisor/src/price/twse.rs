//! Taiwan Stock Exchange realtime quotes
//!
//! Uses the public MIS endpoint. Each query asks for both the listed
//! (`tse_`) and OTC (`otc_`) channel of the ticker; only the one that
//! exists comes back.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use super::{PriceQuote, PriceSource};
use crate::error::{AdvisorError, Result};

pub const TWSE_BASE_URL: &str = "https://mis.twse.com.tw";

/// Placeholder the exchange sends when no trade happened yet
const NO_TRADE: &str = "-";

#[derive(Debug, Deserialize)]
struct StockInfoResponse {
    #[serde(rename = "msgArray", default)]
    msg_array: Vec<StockInfo>,

    #[serde(default)]
    rtcode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StockInfo {
    /// Ticker
    #[serde(rename = "c", default)]
    code: String,

    /// Latest trade price ("-" before the first trade)
    #[serde(rename = "z", default)]
    last_trade: Option<String>,
}

/// Quote source for all-digit Taiwan tickers
pub struct TwseQuoteSource {
    client: reqwest::Client,
}

impl TwseQuoteSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("portfolio-watch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client })
    }

    async fn fetch(&self, symbol: &str) -> Result<PriceQuote> {
        let url = format!("{TWSE_BASE_URL}/stock/api/getStockInfo.jsp");
        let channels = format!("tse_{symbol}.tw|otc_{symbol}.tw");

        let body = self
            .client
            .get(&url)
            .query(&[("ex_ch", channels.as_str()), ("json", "1"), ("delay", "0")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        parse_stock_info(symbol, &body)
    }
}

/// Extract the latest trade price for `symbol` from a MIS response body
fn parse_stock_info(symbol: &str, body: &str) -> Result<PriceQuote> {
    let response: StockInfoResponse = serde_json::from_str(body)?;

    if let Some(code) = response.rtcode.as_deref() {
        if code != "0000" {
            return Err(AdvisorError::quote("TWSE", format!("rtcode {code}")));
        }
    }

    let price = response
        .msg_array
        .iter()
        .filter(|info| info.code == symbol)
        .filter_map(|info| info.last_trade.as_deref())
        .filter(|raw| *raw != NO_TRADE)
        .find_map(|raw| Decimal::from_str(raw.trim()).ok())
        .map(|p| p.normalize());

    Ok(PriceQuote::from_price(price))
}

#[async_trait]
impl PriceSource for TwseQuoteSource {
    async fn lookup(&self, symbol: &str) -> PriceQuote {
        match self.fetch(symbol).await {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!(
                    symbol = %symbol,
                    retryable = e.is_retryable(),
                    "TWSE quote failed: {}",
                    e
                );
                PriceQuote::Unavailable
            }
        }
    }

    fn name(&self) -> &str {
        "TWSE"
    }
}
