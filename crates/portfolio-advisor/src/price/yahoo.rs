//! Yahoo Finance chart quotes for foreign (alphabetic) symbols

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::str::FromStr;
use std::time::Duration;

use super::{PriceQuote, PriceSource};
use crate::error::{AdvisorError, Result};

pub const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,

    #[serde(default)]
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    meta: ChartMeta,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    #[serde(rename = "regularMarketPrice", default)]
    regular_market_price: Option<serde_json::Number>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    #[serde(default)]
    code: String,

    #[serde(default)]
    description: String,
}

/// Quote source for US style symbols
pub struct YahooQuoteSource {
    client: reqwest::Client,
}

impl YahooQuoteSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        // The chart endpoint rejects requests without a browser-like agent.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent("Mozilla/5.0 (compatible; portfolio-watch)")
            .build()?;

        Ok(Self { client })
    }

    async fn fetch(&self, symbol: &str) -> Result<PriceQuote> {
        let url = chart_url(YAHOO_BASE_URL, symbol)?;

        let response = self
            .client
            .get(url)
            .query(&[("interval", "1d"), ("range", "1d")])
            .send()
            .await?;

        // 404 carries a JSON body describing the unknown symbol
        let body = response.text().await?;
        parse_chart(&body)
    }
}

/// Chart endpoint for `symbol`, which is encoded as a single path segment
fn chart_url(base_url: &str, symbol: &str) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base_url).map_err(|e| AdvisorError::quote("Yahoo", e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| AdvisorError::quote("Yahoo", format!("{base_url} cannot take a path")))?
        .pop_if_empty()
        .extend(["v8", "finance", "chart"])
        .push(symbol);
    Ok(url)
}

fn parse_chart(body: &str) -> Result<PriceQuote> {
    let response: ChartResponse = serde_json::from_str(body)?;

    if let Some(err) = response.chart.error {
        if err.code == "Not Found" {
            return Ok(PriceQuote::Unavailable);
        }
        return Err(AdvisorError::quote(
            "Yahoo",
            format!("{}: {}", err.code, err.description),
        ));
    }

    let price = response
        .chart
        .result
        .unwrap_or_default()
        .into_iter()
        .find_map(|r| r.meta.regular_market_price)
        .and_then(|n| Decimal::from_str(&n.to_string()).ok());

    Ok(PriceQuote::from_price(price))
}

#[async_trait]
impl PriceSource for YahooQuoteSource {
    async fn lookup(&self, symbol: &str) -> PriceQuote {
        match self.fetch(symbol).await {
            Ok(quote) => quote,
            Err(e) => {
                tracing::warn!(
                    symbol = %symbol,
                    retryable = e.is_retryable(),
                    "Yahoo quote failed: {}",
                    e
                );
                PriceQuote::Unavailable
            }
        }
    }

    fn name(&self) -> &str {
        "Yahoo"
    }
}
