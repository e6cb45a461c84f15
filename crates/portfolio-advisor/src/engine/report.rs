//! Rebalancing report: held versus target quantities
//!
//! ```text
//! 📈 Portfolio Rebalancing Report 📈
//!
//! 【Tech】
//! - NVIDIA (NVDA): price 4000
//!   held 2, target 3, buy 1
//!   Subtotal: $8,000
//!
//! Total value: $8,000
//! Target value: $10,000
//! Difference: -20.0%
//! ```

use rust_decimal::Decimal;
use std::fmt;
use std::fmt::Write as _;

use super::valuation::{
    CategoryValuation, DataWarning, HoldingValuation, PriceResolution, ValuationEngine, push_warning_footer,
};
use crate::format;
use crate::model::PortfolioDefinition;

/// What to do to reach the target quantity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RebalanceAction {
    Buy(u64),
    Sell(u64),
    TargetReached,
}

impl RebalanceAction {
    pub const fn between(quantity: u64, target_quantity: u64) -> Self {
        if target_quantity > quantity {
            Self::Buy(target_quantity - quantity)
        } else if target_quantity < quantity {
            Self::Sell(quantity - target_quantity)
        } else {
            Self::TargetReached
        }
    }
}

impl fmt::Display for RebalanceAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy(n) => write!(f, "buy {n}"),
            Self::Sell(n) => write!(f, "sell {n}"),
            Self::TargetReached => write!(f, "target reached"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportLine {
    pub holding_id: String,
    pub holding_name: String,
    pub price: PriceResolution,
    pub quantity: u64,
    pub target_quantity: u64,
    pub value: Option<Decimal>,
    pub action: RebalanceAction,
}

impl From<&HoldingValuation> for ReportLine {
    fn from(h: &HoldingValuation) -> Self {
        Self {
            holding_id: h.holding.id.clone(),
            holding_name: h.holding.display_name().to_string(),
            price: h.price,
            quantity: h.holding.quantity,
            target_quantity: h.holding.target_quantity,
            value: h.value,
            action: RebalanceAction::between(h.holding.quantity, h.holding.target_quantity),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportSection {
    pub category: String,
    pub lines: Vec<ReportLine>,
    pub subtotal: Decimal,
}

impl From<&CategoryValuation> for ReportSection {
    fn from(c: &CategoryValuation) -> Self {
        Self {
            category: c.name.clone(),
            lines: c.holdings.iter().map(ReportLine::from).collect(),
            subtotal: c.subtotal,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub sections: Vec<ReportSection>,
    pub total_value: Decimal,
    pub target_value: Decimal,
    /// `None` when the percentage does not fit in a decimal
    pub diff_percent: Option<Decimal>,
    pub warnings: Vec<DataWarning>,
}

impl Report {
    /// `(total - target) / target * 100`, or zero when there is no target
    pub fn diff_percent(total: Decimal, target: Decimal) -> Option<Decimal> {
        if target.is_zero() {
            return Some(Decimal::ZERO);
        }
        total
            .checked_sub(target)?
            .checked_div(target)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    pub fn render(&self) -> String {
        let mut out = String::from("📈 Portfolio Rebalancing Report 📈\n\n");

        for section in &self.sections {
            let _ = writeln!(out, "【{}】", section.category);
            for line in &section.lines {
                let price = line
                    .price
                    .price()
                    .map_or_else(|| format!("{} n/a", format::WARNING_MARK), format::price);
                let _ = writeln!(out, "- {} ({}): price {}", line.holding_name, line.holding_id, price);
                match line.action {
                    RebalanceAction::TargetReached => {
                        let _ = writeln!(out, "  held {}, target reached", line.quantity);
                    }
                    action => {
                        let _ = writeln!(
                            out,
                            "  held {}, target {}, {}",
                            line.quantity, line.target_quantity, action
                        );
                    }
                }
            }
            let _ = writeln!(out, "  Subtotal: {}\n", format::currency(section.subtotal));
        }

        let _ = writeln!(out, "Total value: {}", format::currency(self.total_value));
        let _ = writeln!(out, "Target value: {}", format::currency(self.target_value));
        let difference = self
            .diff_percent
            .map_or_else(|| format!("{} n/a", format::WARNING_MARK), format::percent);
        let _ = writeln!(out, "Difference: {difference}");

        if !self.warnings.is_empty() {
            out.push('\n');
            push_warning_footer(&mut out, &self.warnings);
        }
        out.trim_end().to_string()
    }
}

/// Builds the rebalancing report from a fresh valuation pass
pub struct ReportGenerator {
    valuation: ValuationEngine,
}

impl ReportGenerator {
    pub const fn new(valuation: ValuationEngine) -> Self {
        Self { valuation }
    }

    pub async fn generate(&self, definition: &PortfolioDefinition) -> Report {
        let valuation = self.valuation.valuate(definition).await;
        let target_value = definition.summary.target_value;

        let total_value = valuation.total;
        let diff_percent = Report::diff_percent(total_value, target_value);
        if diff_percent.is_none() {
            tracing::warn!(
                total = %total_value,
                target = %target_value,
                "Difference from target does not fit, reporting it as n/a"
            );
        }

        Report {
            sections: valuation.categories.iter().map(ReportSection::from).collect(),
            total_value,
            target_value,
            diff_percent,
            warnings: valuation.warnings,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{CountingSource, resolver};
    use crate::model::{Categories, Category, Holding, PortfolioSummary};
    use rust_decimal_macros::dec;

    fn nvda_portfolio(target_value: Decimal) -> PortfolioDefinition {
        PortfolioDefinition {
            categories: Categories::new(vec![Category::new(
                "Tech",
                vec![
                    Holding::new("NVDA", "NVIDIA", 2)
                        .with_fallback_price(dec!(4000))
                        .with_target(3)
                        .with_threshold_up(dec!(4200), "Take profit"),
                ],
            )]),
            summary: PortfolioSummary {
                total_value: dec!(8000),
                target_value,
            },
            ..PortfolioDefinition::default()
        }
    }

    fn generator(source: CountingSource) -> ReportGenerator {
        let (resolver, _) = resolver(source);
        ReportGenerator::new(ValuationEngine::new(resolver))
    }

    #[test]
    fn test_rebalance_action() {
        assert_eq!(RebalanceAction::between(2, 3), RebalanceAction::Buy(1));
        assert_eq!(RebalanceAction::between(10, 4), RebalanceAction::Sell(6));
        assert_eq!(RebalanceAction::between(5, 5), RebalanceAction::TargetReached);
        assert_eq!(RebalanceAction::between(0, 0), RebalanceAction::TargetReached);
        assert_eq!(RebalanceAction::Sell(6).to_string(), "sell 6");
    }

    #[test]
    fn test_diff_percent_guards_zero_target() {
        assert_eq!(Report::diff_percent(dec!(8000), Decimal::ZERO), Some(Decimal::ZERO));
        assert_eq!(Report::diff_percent(dec!(8000), dec!(10000)), Some(dec!(-20)));
        assert_eq!(Report::diff_percent(dec!(12000), dec!(10000)), Some(dec!(20)));
    }

    #[tokio::test]
    async fn test_report_with_fallback_price() {
        let report = generator(CountingSource::new()).generate(&nvda_portfolio(dec!(10000))).await;

        assert_eq!(report.total_value, dec!(8000));
        assert_eq!(report.sections[0].lines[0].action, RebalanceAction::Buy(1));
        assert_eq!(
            report.render(),
            "📈 Portfolio Rebalancing Report 📈\n\n\
             【Tech】\n\
             - NVIDIA (NVDA): price 4000\n\
             \x20 held 2, target 3, buy 1\n\
             \x20 Subtotal: $8,000\n\n\
             Total value: $8,000\n\
             Target value: $10,000\n\
             Difference: -20.0%"
        );
    }

    #[tokio::test]
    async fn test_zero_target_value_reports_zero_difference() {
        let report = generator(CountingSource::new()).generate(&nvda_portfolio(Decimal::ZERO)).await;
        assert_eq!(report.diff_percent, Some(Decimal::ZERO));
        assert!(report.render().ends_with("Difference: 0.0%"));
    }

    #[tokio::test]
    async fn test_target_reached_and_sell_lines() {
        let def = PortfolioDefinition {
            categories: Categories::new(vec![Category::new(
                "Taiwan",
                vec![
                    Holding::new("2330", "TSMC", 100).with_target(100),
                    Holding::new("0056", "High Dividend", 1000).with_target(600),
                ],
            )]),
            ..PortfolioDefinition::default()
        };
        let report = generator(
            CountingSource::new()
                .with_price("2330", dec!(585))
                .with_price("0056", dec!(36.45)),
        )
        .generate(&def)
        .await;

        let text = report.render();
        assert!(text.contains("- TSMC (2330): price 585\n  held 100, target reached\n"));
        assert!(text.contains("- High Dividend (0056): price 36.45\n  held 1000, target 600, sell 400\n"));
        assert!(text.contains("  Subtotal: $94,950\n"));
    }

    #[tokio::test]
    async fn test_report_total_matches_status_total() {
        let def = nvda_portfolio(dec!(10000));
        let (resolver, _) = resolver(CountingSource::new().with_price("NVDA", dec!(4156.75)));
        let engine = ValuationEngine::new(resolver.clone());

        let status_total = engine.valuate(&def).await.total;
        let report = ReportGenerator::new(ValuationEngine::new(resolver)).generate(&def).await;
        assert_eq!(report.total_value, status_total);
        assert_eq!(report.total_value, dec!(8313.5));
    }

    #[tokio::test]
    async fn test_missing_prices_are_called_out() {
        let def = PortfolioDefinition {
            categories: Categories::new(vec![Category::new("Misc", vec![Holding::new("9999", "", 5)])]),
            ..PortfolioDefinition::default()
        };
        let report = generator(CountingSource::new()).generate(&def).await;

        assert_eq!(report.warnings[0].holding_id, "9999");
        let text = report.render();
        assert!(text.contains("- 9999 (9999): price ⚠️ n/a\n"));
        assert!(text.ends_with("⚠️ No price available for: 9999"));
    }

    #[tokio::test]
    async fn test_tiny_target_value_reports_difference_as_unavailable() {
        let target = dec!(0.0000000000000000000000000001);
        assert_eq!(Report::diff_percent(dec!(8000), target), None);

        let report = generator(CountingSource::new()).generate(&nvda_portfolio(target)).await;
        assert_eq!(report.diff_percent, None);
        assert_eq!(report.total_value, dec!(8000));
        assert!(report.render().ends_with("Target value: $0\nDifference: ⚠️ n/a"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_lookup_is_noted_in_report() {
        let report = generator(CountingSource::new().hanging("NVDA"))
            .generate(&nvda_portfolio(dec!(10000)))
            .await;
        assert!(report.render().ends_with(
            "Difference: -20.0%\n\n⚠️ Price lookup timed out, stored price used for: NVDA"
        ));
    }

    #[tokio::test]
    async fn test_empty_portfolio_report() {
        let report = generator(CountingSource::new()).generate(&PortfolioDefinition::empty()).await;
        assert!(report.sections.is_empty());
        assert_eq!(
            report.render(),
            "📈 Portfolio Rebalancing Report 📈\n\nTotal value: $0\nTarget value: $0\nDifference: 0.0%"
        );
    }
}
