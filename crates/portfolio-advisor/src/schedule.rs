//! The periodic portfolio pass

use async_trait::async_trait;
use bot_core::{ScheduledJob, Result as BotResult};
use chrono::{DateTime, Local};
use std::sync::Arc;

use crate::advisor::{AlertMode, PortfolioAdvisor};
use crate::store::PortfolioStore;

/// One scheduled pass: status at the configured times, then an alert check
///
/// Neither step replies to anyone. The status goes out only when the tick
/// falls on a notification time; the alert message only when something fired.
pub struct PortfolioPass {
    advisor: Arc<PortfolioAdvisor>,
    store: Arc<dyn PortfolioStore>,
}

impl PortfolioPass {
    pub fn new(advisor: Arc<PortfolioAdvisor>, store: Arc<dyn PortfolioStore>) -> Self {
        Self { advisor, store }
    }
}

#[async_trait]
impl ScheduledJob for PortfolioPass {
    fn name(&self) -> &str {
        "portfolio-pass"
    }

    async fn run_pass(&self, now: DateTime<Local>) -> BotResult<()> {
        let rules = self.store.load().await.monitoring_rules;

        if rules.is_notification_time(&now) {
            tracing::info!(time = %now.format("%H:%M"), "Sending scheduled status");
            self.advisor.send_status().await;
        }

        self.advisor.check_alerts(AlertMode::Automatic).await;
        Ok(())
    }
}
