//! Current value of every holding, category and the whole portfolio

use rust_decimal::Decimal;
use std::fmt;
use std::fmt::Write as _;

use super::{LiveLookup, PriceResolver};
use crate::format;
use crate::model::{Holding, PortfolioDefinition};

/// Where a holding's price came from
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriceResolution {
    /// Fresh quote from the price source
    Live(Decimal),
    /// Stored `current_price`, because no live quote was available
    Fallback(Decimal),
    /// Neither; the holding is valued at zero and flagged
    Missing,
}

impl PriceResolution {
    pub const fn price(&self) -> Option<Decimal> {
        match self {
            Self::Live(p) | Self::Fallback(p) => Some(*p),
            Self::Missing => None,
        }
    }

    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WarningKind {
    /// The live lookup did not answer in time
    LookupTimedOut,
    /// No live price and no usable fallback price
    MissingPrice,
    /// Price times quantity does not fit in a decimal
    ValueOverflow,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LookupTimedOut => write!(f, "price lookup timed out"),
            Self::MissingPrice => write!(f, "no live or fallback price"),
            Self::ValueOverflow => write!(f, "value too large to compute"),
        }
    }
}

/// Data-quality problem found during a pass
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataWarning {
    pub holding_id: String,
    pub kind: WarningKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HoldingValuation {
    pub holding: Holding,
    pub price: PriceResolution,
    /// `None` when the value overflowed; such a holding adds nothing to the totals
    pub value: Option<Decimal>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryValuation {
    pub name: String,
    pub holdings: Vec<HoldingValuation>,
    pub subtotal: Decimal,
}

/// Result of one valuation pass, in declaration order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Valuation {
    pub categories: Vec<CategoryValuation>,
    pub total: Decimal,
    pub warnings: Vec<DataWarning>,
}

impl Valuation {
    pub fn holdings(&self) -> impl Iterator<Item = &HoldingValuation> {
        self.categories.iter().flat_map(|c| c.holdings.iter())
    }

    fn flag(&mut self, holding: &Holding, category: &str, kind: WarningKind) {
        tracing::warn!(
            holding = %holding.id,
            category = %category,
            "Data quality: {}",
            kind
        );
        self.warnings.push(DataWarning {
            holding_id: holding.id.clone(),
            kind,
        });
    }

    /// Status message text
    ///
    /// ```text
    /// 📊 Portfolio value: $8,000
    ///
    /// 【Tech】
    /// - NVIDIA (NVDA): 4000 x 2 = $8,000
    /// ```
    pub fn render_status(&self) -> String {
        let mut out = format!("📊 Portfolio value: {}\n\n", format::currency(self.total));

        for category in &self.categories {
            let _ = writeln!(out, "【{}】", category.name);
            for h in &category.holdings {
                let price = h
                    .price
                    .price()
                    .map_or_else(|| format!("{} n/a", format::WARNING_MARK), format::price);
                let _ = writeln!(
                    out,
                    "- {} ({}): {} x {} = {}",
                    h.holding.display_name(),
                    h.holding.id,
                    price,
                    h.holding.quantity,
                    value_text(h.value)
                );
            }
            out.push('\n');
        }

        push_warning_footer(&mut out, &self.warnings);
        out.trim_end().to_string()
    }
}

fn value_text(value: Option<Decimal>) -> String {
    value.map_or_else(|| format!("{} n/a", format::WARNING_MARK), format::currency)
}

/// Footer naming the holdings behind each kind of data-quality warning
pub(crate) fn push_warning_footer(out: &mut String, warnings: &[DataWarning]) {
    let kinds = [
        (WarningKind::MissingPrice, "No price available for"),
        (WarningKind::LookupTimedOut, "Price lookup timed out, stored price used for"),
        (WarningKind::ValueOverflow, "Value too large to compute for"),
    ];
    for (kind, label) in kinds {
        let ids: Vec<&str> = warnings
            .iter()
            .filter(|w| w.kind == kind)
            .map(|w| w.holding_id.as_str())
            .collect();
        if !ids.is_empty() {
            let _ = writeln!(out, "{} {}: {}", format::WARNING_MARK, label, ids.join(", "));
        }
    }
}

/// Valuation pass over a portfolio
pub struct ValuationEngine {
    resolver: PriceResolver,
}

impl ValuationEngine {
    pub const fn new(resolver: PriceResolver) -> Self {
        Self { resolver }
    }

    /// Value every holding, querying the price source once per holding
    pub async fn valuate(&self, definition: &PortfolioDefinition) -> Valuation {
        let mut valuation = Valuation::default();

        for category in &definition.categories {
            let mut holdings = Vec::with_capacity(category.holdings.len());
            let mut subtotal = Decimal::ZERO;

            for holding in &category.holdings {
                let (price, warning) = self.resolve(holding).await;
                if let Some(kind) = warning {
                    valuation.flag(holding, &category.name, kind);
                }

                // Accept a value only if both the subtotal and the running
                // total stay representable.
                let running = valuation.total + subtotal;
                let value = price
                    .price()
                    .unwrap_or(Decimal::ZERO)
                    .checked_mul(Decimal::from(holding.quantity))
                    .filter(|v| subtotal.checked_add(*v).is_some() && running.checked_add(*v).is_some());

                match value {
                    Some(v) => subtotal += v,
                    None => valuation.flag(holding, &category.name, WarningKind::ValueOverflow),
                }
                holdings.push(HoldingValuation {
                    holding: holding.clone(),
                    price,
                    value,
                });
            }

            valuation.total += subtotal;
            valuation.categories.push(CategoryValuation {
                name: category.name.clone(),
                holdings,
                subtotal,
            });
        }

        tracing::debug!(
            holdings = definition.holding_count(),
            total = %valuation.total,
            warnings = valuation.warnings.len(),
            "Valuation complete"
        );
        valuation
    }

    async fn resolve(&self, holding: &Holding) -> (PriceResolution, Option<WarningKind>) {
        let live = self.resolver.live(&holding.id).await;
        if let LiveLookup::Found(price) = live {
            return (PriceResolution::Live(price), None);
        }

        let timed_out = matches!(live, LiveLookup::TimedOut).then_some(WarningKind::LookupTimedOut);
        match holding.usable_fallback() {
            Some(price) => (PriceResolution::Fallback(price), timed_out),
            None => (PriceResolution::Missing, Some(WarningKind::MissingPrice)),
        }
    }
}
