//! Domain Models
//!
//! The declarative portfolio definition as stored on disk.
//! Uses `rust_decimal` for all monetary values - never use f64 for money!
//!
//! ```json
//! {
//!   "portfolio": {
//!     "Tech": [
//!       { "id": "NVDA", "name": "NVIDIA", "quantity": 2, "current_price": 4000,
//!         "target_quantity": 3, "threshold_up": 4200, "action_up": "Trim" }
//!     ]
//!   },
//!   "portfolio_summary": { "total_value": 8000, "target_value": 10000 },
//!   "monitoring_rules": { "notification_time": ["09:00", "13:30"] }
//! }
//! ```

use chrono::{DateTime, NaiveTime, TimeZone};
use rust_decimal::Decimal;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::error::{AdvisorError, Result};

/// Format of a notification time entry
pub const NOTIFICATION_TIME_FORMAT: &str = "%H:%M";

/// One tracked position
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// Ticker symbol, also the quote lookup key (e.g. "2330", "NVDA")
    pub id: String,

    /// Display label
    #[serde(default)]
    pub name: String,

    /// Units currently held
    pub quantity: u64,

    /// Last known price, used only when a live quote is unavailable
    #[serde(default)]
    pub current_price: Option<Decimal>,

    /// Units wanted at the rebalance target
    pub target_quantity: u64,

    /// Alert when the live price falls to or below this value
    #[serde(default)]
    pub threshold_down: Option<Decimal>,

    /// Alert when the live price rises to or above this value
    #[serde(default)]
    pub threshold_up: Option<Decimal>,

    /// Suggested action shown with a down-alert
    #[serde(default)]
    pub action_down: String,

    /// Suggested action shown with an up-alert
    #[serde(default)]
    pub action_up: String,
}

impl Holding {
    pub fn new(id: impl Into<String>, name: impl Into<String>, quantity: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            quantity,
            current_price: None,
            target_quantity: quantity,
            threshold_down: None,
            threshold_up: None,
            action_down: String::new(),
            action_up: String::new(),
        }
    }

    pub const fn with_fallback_price(mut self, price: Decimal) -> Self {
        self.current_price = Some(price);
        self
    }

    pub const fn with_target(mut self, target_quantity: u64) -> Self {
        self.target_quantity = target_quantity;
        self
    }

    pub fn with_threshold_down(mut self, threshold: Decimal, action: impl Into<String>) -> Self {
        self.threshold_down = Some(threshold);
        self.action_down = action.into();
        self
    }

    pub fn with_threshold_up(mut self, threshold: Decimal, action: impl Into<String>) -> Self {
        self.threshold_up = Some(threshold);
        self.action_up = action.into();
        self
    }

    /// Name to show to the user; falls back to the ticker
    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() {
            &self.id
        } else {
            &self.name
        }
    }

    /// Stored fallback price, if it is usable (present and positive)
    pub fn usable_fallback(&self) -> Option<Decimal> {
        self.current_price.filter(|p| *p > Decimal::ZERO)
    }

    /// Lower alert bound; zero or negative means no alert on that side
    pub fn alert_floor(&self) -> Option<Decimal> {
        self.threshold_down.filter(|t| *t > Decimal::ZERO)
    }

    /// Upper alert bound; zero or negative means no alert on that side
    pub fn alert_ceiling(&self) -> Option<Decimal> {
        self.threshold_up.filter(|t| *t > Decimal::ZERO)
    }
}

/// A named group of holdings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub holdings: Vec<Holding>,
}

impl Category {
    pub fn new(name: impl Into<String>, holdings: Vec<Holding>) -> Self {
        Self {
            name: name.into(),
            holdings,
        }
    }
}

/// Categories in document order
///
/// Stored as a JSON object (`name -> [holding]`); the declaration order of
/// the object keys is kept so every message lists categories the same way.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Categories(Vec<Category>);

impl Categories {
    pub const fn new(categories: Vec<Category>) -> Self {
        Self(categories)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Categories {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl Serialize for Categories {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for category in &self.0 {
            map.serialize_entry(&category.name, &category.holdings)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Categories {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct OrderedVisitor;

        impl<'de> Visitor<'de> for OrderedVisitor {
            type Value = Categories;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category name to a list of holdings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> std::result::Result<Self::Value, A::Error> {
                let mut categories: Vec<Category> = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some((name, holdings)) = access.next_entry::<String, Vec<Holding>>()? {
                    if categories.iter().any(|c| c.name == name) {
                        return Err(serde::de::Error::custom(format!("duplicate category '{name}'")));
                    }
                    categories.push(Category { name, holdings });
                }
                Ok(Categories(categories))
            }
        }

        deserializer.deserialize_map(OrderedVisitor)
    }
}

/// Informational totals recorded alongside the holdings
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    /// Recorded snapshot of the total value (not recomputed)
    #[serde(default)]
    pub total_value: Decimal,

    /// Value the portfolio should reach once rebalanced
    #[serde(default)]
    pub target_value: Decimal,
}

/// When the scheduled status message goes out
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitoringRules {
    /// Local wall-clock times in "HH:MM" form
    #[serde(default, alias = "notification_time")]
    pub notification_times: BTreeSet<String>,
}

impl MonitoringRules {
    /// Does `now` fall on one of the configured minutes?
    pub fn is_notification_time<Tz>(&self, now: &DateTime<Tz>) -> bool
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let current = now.format(NOTIFICATION_TIME_FORMAT).to_string();
        self.notification_times.contains(&current)
    }

    /// Entries that are not valid "HH:MM" times (they never match)
    pub fn invalid_times(&self) -> Vec<&str> {
        self.notification_times
            .iter()
            .filter(|t| NaiveTime::parse_from_str(t, NOTIFICATION_TIME_FORMAT).is_err() || t.len() != 5)
            .map(String::as_str)
            .collect()
    }
}

/// Root of the stored portfolio document
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioDefinition {
    #[serde(rename = "portfolio", default)]
    pub categories: Categories,

    #[serde(rename = "portfolio_summary", default)]
    pub summary: PortfolioSummary,

    #[serde(default)]
    pub monitoring_rules: MonitoringRules,
}

impl PortfolioDefinition {
    /// An empty-but-valid portfolio
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON document
    pub fn from_json(text: &str) -> Result<Self> {
        let definition: Self = serde_json::from_str(text)?;
        definition.validate()?;
        Ok(definition)
    }

    /// Pretty JSON in the stored document layout
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check the structural invariants: non-empty ids, unique across the
    /// whole portfolio.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for (category, holding) in self.holdings() {
            if holding.id.trim().is_empty() {
                return Err(AdvisorError::InvalidPortfolio(format!(
                    "holding with empty id in category '{}'",
                    category.name
                )));
            }
            if !seen.insert(holding.id.as_str()) {
                return Err(AdvisorError::InvalidPortfolio(format!(
                    "holding id '{}' appears more than once",
                    holding.id
                )));
            }
        }
        Ok(())
    }

    /// Every holding with its category, in declaration order
    pub fn holdings(&self) -> impl Iterator<Item = (&Category, &Holding)> {
        self.categories
            .iter()
            .flat_map(|c| c.holdings.iter().map(move |h| (c, h)))
    }

    /// Find a holding by ticker
    pub fn holding(&self, id: &str) -> Option<&Holding> {
        self.holdings().map(|(_, h)| h).find(|h| h.id == id)
    }

    /// Number of holdings across all categories
    pub fn holding_count(&self) -> usize {
        self.categories.iter().map(|c| c.holdings.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.holding_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, Utc};
    use rust_decimal_macros::dec;

    const DOC: &str = r#"{
        "portfolio": {
            "Tech": [
                {"id": "NVDA", "name": "NVIDIA", "quantity": 2, "current_price": 4000,
                 "target_quantity": 3, "threshold_down": null, "threshold_up": 4200,
                 "action_down": "", "action_up": "Take profit"}
            ],
            "Dividend": [
                {"id": "0056", "name": "Yuanta High Dividend", "quantity": 1000,
                 "current_price": 36.45, "target_quantity": 1000}
            ],
            "Bonds": []
        },
        "portfolio_summary": {"total_value": 1234567, "target_value": 2000000},
        "monitoring_rules": {"notification_time": ["09:00", "13:30"]}
    }"#;

    #[test]
    fn test_parse_keeps_declaration_order() {
        let def = PortfolioDefinition::from_json(DOC).unwrap();
        let names: Vec<_> = def.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Tech", "Dividend", "Bonds"]);
        assert_eq!(def.holding_count(), 2);

        let nvda = def.holding("NVDA").unwrap();
        assert_eq!(nvda.threshold_down, None);
        assert_eq!(nvda.threshold_up, Some(dec!(4200)));
        assert_eq!(def.holding("0056").unwrap().current_price, Some(dec!(36.45)));
        assert_eq!(def.summary.target_value, dec!(2000000));
        assert!(def.monitoring_rules.notification_times.contains("13:30"));
    }

    #[test]
    fn test_missing_sections_default_to_empty() {
        let def = PortfolioDefinition::from_json("{}").unwrap();
        assert!(def.is_empty());
        assert_eq!(def.summary.target_value, Decimal::ZERO);
        assert!(def.monitoring_rules.notification_times.is_empty());
    }

    #[test]
    fn test_rejects_negative_quantity() {
        let doc = r#"{"portfolio": {"A": [{"id": "X", "quantity": -1, "target_quantity": 0}]}}"#;
        assert!(PortfolioDefinition::from_json(doc).is_err());
    }

    #[test]
    fn test_rejects_duplicate_ids_across_categories() {
        let doc = r#"{"portfolio": {
            "A": [{"id": "X", "quantity": 1, "target_quantity": 1}],
            "B": [{"id": "X", "quantity": 2, "target_quantity": 2}]
        }}"#;
        let err = PortfolioDefinition::from_json(doc).unwrap_err();
        assert!(err.to_string().contains("'X'"));
    }

    #[test]
    fn test_rejects_empty_id() {
        let doc = r#"{"portfolio": {"A": [{"id": " ", "quantity": 1, "target_quantity": 1}]}}"#;
        assert!(matches!(
            PortfolioDefinition::from_json(doc),
            Err(AdvisorError::InvalidPortfolio(_))
        ));
    }

    #[test]
    fn test_json_round_trip_keeps_order() {
        let def = PortfolioDefinition::from_json(DOC).unwrap();
        let again = PortfolioDefinition::from_json(&def.to_json().unwrap()).unwrap();
        assert_eq!(def, again);
    }

    #[test]
    fn test_notification_time_matching() {
        let def = PortfolioDefinition::from_json(DOC).unwrap();
        let rules = &def.monitoring_rules;

        let tz = FixedOffset::east_opt(8 * 3600).unwrap();
        let at_nine = tz.with_ymd_and_hms(2026, 3, 2, 9, 0, 41).unwrap();
        let at_ten = tz.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap();
        assert!(rules.is_notification_time(&at_nine));
        assert!(!rules.is_notification_time(&at_ten));

        let utc = Utc.with_ymd_and_hms(2026, 3, 2, 13, 30, 0).unwrap();
        assert!(rules.is_notification_time(&utc));
    }

    #[test]
    fn test_invalid_notification_times_are_reported() {
        let rules = MonitoringRules {
            notification_times: ["09:00", "9:00", "25:00", "noon"]
                .into_iter()
                .map(String::from)
                .collect(),
        };
        assert_eq!(rules.invalid_times(), vec!["25:00", "9:00", "noon"]);
    }

    #[test]
    fn test_non_positive_thresholds_do_not_arm_alerts() {
        let doc = r#"{"portfolio": {"A": [{"id": "X", "quantity": 1, "target_quantity": 1,
            "threshold_down": -5, "threshold_up": 0}]}}"#;
        let x = PortfolioDefinition::from_json(doc).unwrap().holding("X").unwrap().clone();
        assert_eq!(x.threshold_up, Some(Decimal::ZERO));
        assert_eq!(x.alert_floor(), None);
        assert_eq!(x.alert_ceiling(), None);

        let def = PortfolioDefinition::from_json(DOC).unwrap();
        assert_eq!(def.holding("NVDA").unwrap().alert_ceiling(), Some(dec!(4200)));
    }

    #[test]
    fn test_display_name_falls_back_to_id() {
        let h = Holding::new("2330", "", 10);
        assert_eq!(h.display_name(), "2330");
        assert_eq!(Holding::new("2330", "TSMC", 10).display_name(), "TSMC");
    }
}
