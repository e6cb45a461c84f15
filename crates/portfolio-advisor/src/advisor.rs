//! Portfolio Advisor
//!
//! Entry points shared by the chat commands and the scheduled pass. Each call
//! reloads the portfolio document and re-queries prices.

use bot_core::Notifier;
use std::sync::Arc;

use crate::engine::{AlertEvaluator, PriceResolver, ReportGenerator, ValuationEngine, combine_alerts};
use crate::error::{AdvisorError, Result};
use crate::format;
use crate::store::PortfolioStore;

/// How an alert check was started
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertMode {
    /// Scheduled pass: silent when nothing fired
    Automatic,
    /// User asked for it: always acknowledged
    Manual,
}

/// Outcome of one alert check
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AlertCheck {
    /// Alerts that fired
    pub triggered: usize,
    /// Whether the combined alert message reached the notifier
    pub delivered: bool,
}

impl AlertCheck {
    /// Reply for a manual check
    pub fn acknowledgement(&self) -> String {
        match (self.triggered, self.delivered) {
            (0, _) => "✅ Alert check complete: no thresholds crossed.".into(),
            (n, true) => format!("✅ Alert check complete: {n} alert(s) triggered and sent."),
            (n, false) => format!(
                "{} Alert check complete: {n} alert(s) triggered, but the notification could not be sent.",
                format::WARNING_MARK
            ),
        }
    }
}

pub struct PortfolioAdvisor {
    store: Arc<dyn PortfolioStore>,
    resolver: PriceResolver,
    notifier: Arc<dyn Notifier>,
}

impl PortfolioAdvisor {
    pub fn new(store: Arc<dyn PortfolioStore>, resolver: PriceResolver, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            resolver,
            notifier,
        }
    }

    /// Current valuation as chat text
    pub async fn status_message(&self) -> String {
        let definition = self.store.load().await;
        ValuationEngine::new(self.resolver.clone())
            .valuate(&definition)
            .await
            .render_status()
    }

    /// Push the status message; false when delivery failed
    pub async fn send_status(&self) -> bool {
        let message = self.status_message().await;
        self.deliver(&message).await
    }

    /// Rebalancing report as chat text
    pub async fn report_message(&self) -> String {
        let definition = self.store.load().await;
        ReportGenerator::new(ValuationEngine::new(self.resolver.clone()))
            .generate(&definition)
            .await
            .render()
    }

    /// Evaluate thresholds and push one combined message when any fired
    pub async fn check_alerts(&self, mode: AlertMode) -> AlertCheck {
        let definition = self.store.load().await;
        let alerts = AlertEvaluator::new(self.resolver.clone())
            .evaluate(&definition)
            .await;

        let mut check = AlertCheck {
            triggered: alerts.len(),
            delivered: false,
        };
        if let Some(message) = combine_alerts(&alerts) {
            check.delivered = self.deliver(&message).await;
        }

        tracing::info!(
            mode = ?mode,
            triggered = check.triggered,
            delivered = check.delivered,
            "Alert check finished"
        );
        check
    }

    /// Live price of a single ticker
    pub async fn lookup_price(&self, symbol: &str) -> Result<rust_decimal::Decimal> {
        self.resolver
            .live(symbol)
            .await
            .price()
            .ok_or_else(|| AdvisorError::PriceUnavailable(symbol.to_string()))
    }

    /// Reply text for a single ticker lookup
    pub async fn lookup_message(&self, symbol: &str) -> String {
        match self.lookup_price(symbol).await {
            Ok(price) => format!("{} price: {}", symbol, format::price(price)),
            Err(e) => {
                tracing::debug!(symbol = %symbol, "{}", e);
                format!("Unable to get a price for {symbol}")
            }
        }
    }

    async fn deliver(&self, message: &str) -> bool {
        let sent = self.notifier.send(message).await;
        if !sent {
            tracing::warn!(notifier = self.notifier.name(), "Notification was not delivered");
        }
        sent
    }
}
