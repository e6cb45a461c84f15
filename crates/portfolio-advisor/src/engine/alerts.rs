//! Threshold alerts
//!
//! Alerts only ever look at live prices. A stored fallback price is stale by
//! definition and must not trigger a price-crossing alert.

use rust_decimal::Decimal;
use std::fmt;

use super::PriceResolver;
use crate::format;
use crate::model::{Holding, PortfolioDefinition};

/// Which bound was crossed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertDirection {
    Down,
    Up,
}

impl fmt::Display for AlertDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Down => write!(f, "down"),
            Self::Up => write!(f, "up"),
        }
    }
}

/// One triggered threshold (lives for a single notification)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AlertRecord {
    pub holding_id: String,
    pub holding_name: String,
    pub direction: AlertDirection,
    pub current_price: Decimal,
    pub threshold: Decimal,
    pub suggested_action: String,
}

impl AlertRecord {
    fn new(holding: &Holding, direction: AlertDirection, current_price: Decimal, threshold: Decimal) -> Self {
        let action = match direction {
            AlertDirection::Down => &holding.action_down,
            AlertDirection::Up => &holding.action_up,
        };
        Self {
            holding_id: holding.id.clone(),
            holding_name: holding.display_name().to_string(),
            direction,
            current_price,
            threshold,
            suggested_action: action.trim().to_string(),
        }
    }

    /// Chat text for this alert
    pub fn render(&self) -> String {
        let (mark, relation) = match self.direction {
            AlertDirection::Down => (format::WARNING_MARK, "at or below"),
            AlertDirection::Up => ("🔔", "at or above"),
        };
        let mut line = format!(
            "{} {} ({}) price {}, {} alert price {}!",
            mark,
            self.holding_name,
            self.holding_id,
            format::price(self.current_price),
            relation,
            format::price(self.threshold)
        );
        if !self.suggested_action.is_empty() {
            line.push_str("\nSuggested action: ");
            line.push_str(&self.suggested_action);
        }
        line
    }
}

/// Collapse a pass's alerts into one message; `None` when nothing fired
pub fn combine_alerts(alerts: &[AlertRecord]) -> Option<String> {
    if alerts.is_empty() {
        return None;
    }
    Some(alerts.iter().map(AlertRecord::render).collect::<Vec<_>>().join("\n\n"))
}

/// Scans holdings against their thresholds
pub struct AlertEvaluator {
    resolver: PriceResolver,
}

impl AlertEvaluator {
    pub const fn new(resolver: PriceResolver) -> Self {
        Self { resolver }
    }

    /// Alerts for every holding with a live price, in declaration order
    ///
    /// Bounds are inclusive and the two sides are checked independently, so
    /// one holding can produce both a down- and an up-alert.
    pub async fn evaluate(&self, definition: &PortfolioDefinition) -> Vec<AlertRecord> {
        let mut alerts = Vec::new();

        for (_, holding) in definition.holdings() {
            let (floor, ceiling) = (holding.alert_floor(), holding.alert_ceiling());
            if floor.is_none() && ceiling.is_none() {
                continue;
            }

            let Some(price) = self.resolver.live(&holding.id).await.price() else {
                tracing::debug!(holding = %holding.id, "No live price, skipping alert check");
                continue;
            };

            if let Some(threshold) = floor {
                if price <= threshold {
                    alerts.push(AlertRecord::new(holding, AlertDirection::Down, price, threshold));
                }
            }
            if let Some(threshold) = ceiling {
                if price >= threshold {
                    alerts.push(AlertRecord::new(holding, AlertDirection::Up, price, threshold));
                }
            }
        }

        for alert in &alerts {
            tracing::info!(
                holding = %alert.holding_id,
                direction = %alert.direction,
                price = %alert.current_price,
                threshold = %alert.threshold,
                "Threshold crossed"
            );
        }
        alerts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{CountingSource, resolver};
    use crate::model::{Categories, Category};
    use rust_decimal_macros::dec;

    fn nvda() -> Holding {
        Holding::new("NVDA", "NVIDIA", 2)
            .with_fallback_price(dec!(4000))
            .with_target(3)
            .with_threshold_up(dec!(4200), "Take profit")
    }

    fn single(holding: Holding) -> PortfolioDefinition {
        PortfolioDefinition {
            categories: Categories::new(vec![Category::new("Tech", vec![holding])]),
            ..PortfolioDefinition::default()
        }
    }

    #[tokio::test]
    async fn test_fallback_never_alerts() {
        let (resolver, _) = resolver(CountingSource::new());
        let alerts = AlertEvaluator::new(resolver).evaluate(&single(nvda())).await;
        assert!(alerts.is_empty());
        assert_eq!(combine_alerts(&alerts), None);
    }

    #[tokio::test]
    async fn test_up_alert_at_exact_threshold() {
        let (resolver, _) = resolver(CountingSource::new().with_price("NVDA", dec!(4200)));
        let alerts = AlertEvaluator::new(resolver).evaluate(&single(nvda())).await;

        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].direction, AlertDirection::Up);
        assert_eq!(alerts[0].current_price, dec!(4200));
        assert_eq!(alerts[0].threshold, dec!(4200));
        assert_eq!(
            alerts[0].render(),
            "🔔 NVIDIA (NVDA) price 4200, at or above alert price 4200!\nSuggested action: Take profit"
        );
    }

    #[tokio::test]
    async fn test_both_bounds_fire_at_the_same_price() {
        let holding = Holding::new("0056", "High Dividend", 1000)
            .with_threshold_down(dec!(36.45), "Add more")
            .with_threshold_up(dec!(36.45), "Hold");
        let (resolver, _) = resolver(CountingSource::new().with_price("0056", dec!(36.45)));

        let alerts = AlertEvaluator::new(resolver).evaluate(&single(holding)).await;
        let directions: Vec<_> = alerts.iter().map(|a| a.direction).collect();
        assert_eq!(directions, vec![AlertDirection::Down, AlertDirection::Up]);

        let message = combine_alerts(&alerts).unwrap();
        assert_eq!(
            message,
            "⚠️ High Dividend (0056) price 36.45, at or below alert price 36.45!\nSuggested action: Add more\n\n\
             🔔 High Dividend (0056) price 36.45, at or above alert price 36.45!\nSuggested action: Hold"
        );
    }

    #[tokio::test]
    async fn test_price_inside_band_is_quiet() {
        let holding = Holding::new("2330", "TSMC", 10)
            .with_threshold_down(dec!(500), "Buy")
            .with_threshold_up(dec!(700), "Sell");
        let (resolver, _) = resolver(CountingSource::new().with_price("2330", dec!(585)));

        assert!(AlertEvaluator::new(resolver).evaluate(&single(holding)).await.is_empty());
    }

    #[tokio::test]
    async fn test_unset_thresholds_skip_lookup() {
        let (resolver, source) = resolver(CountingSource::new().with_price("2330", dec!(1)));
        let alerts = AlertEvaluator::new(resolver)
            .evaluate(&single(Holding::new("2330", "TSMC", 10)))
            .await;

        assert!(alerts.is_empty());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_zero_thresholds_are_unset() {
        let holding = Holding::new("2330", "TSMC", 10)
            .with_threshold_down(Decimal::ZERO, "Buy")
            .with_threshold_up(Decimal::ZERO, "Sell");
        let (resolver, source) = resolver(CountingSource::new().with_price("2330", dec!(100)));

        let alerts = AlertEvaluator::new(resolver).evaluate(&single(holding)).await;
        assert!(alerts.is_empty());
        assert!(source.calls().is_empty());
    }

    #[tokio::test]
    async fn test_zero_ceiling_leaves_floor_active() {
        let holding = Holding::new("2330", "TSMC", 10)
            .with_threshold_down(dec!(600), "Buy")
            .with_threshold_up(Decimal::ZERO, "Sell");
        let (resolver, _) = resolver(CountingSource::new().with_price("2330", dec!(585)));

        let alerts = AlertEvaluator::new(resolver).evaluate(&single(holding)).await;
        let directions: Vec<_> = alerts.iter().map(|a| a.direction).collect();
        assert_eq!(directions, vec![AlertDirection::Down]);
    }

    #[tokio::test]
    async fn test_empty_action_omits_suggestion_line() {
        let holding = Holding::new("2330", "TSMC", 10).with_threshold_down(dec!(600), " ");
        let (resolver, _) = resolver(CountingSource::new().with_price("2330", dec!(585)));

        let alerts = AlertEvaluator::new(resolver).evaluate(&single(holding)).await;
        assert_eq!(alerts[0].render(), "⚠️ TSMC (2330) price 585, at or below alert price 600!");
    }

    #[tokio::test]
    async fn test_alerts_follow_declaration_order() {
        let def = PortfolioDefinition {
            categories: Categories::new(vec![
                Category::new("B", vec![Holding::new("2330", "TSMC", 1).with_threshold_up(dec!(500), "")]),
                Category::new("A", vec![nvda()]),
            ]),
            ..PortfolioDefinition::default()
        };
        let (resolver, _) = resolver(
            CountingSource::new()
                .with_price("2330", dec!(585))
                .with_price("NVDA", dec!(4300)),
        );

        let ids: Vec<_> = AlertEvaluator::new(resolver)
            .evaluate(&def)
            .await
            .into_iter()
            .map(|a| a.holding_id)
            .collect();
        assert_eq!(ids, vec!["2330", "NVDA"]);
    }
}
