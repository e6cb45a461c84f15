//! # portfolio-advisor
//!
//! Portfolio valuation, threshold alerts and rebalancing reports over a
//! declarative portfolio document and live quotes.
//!
//! ## Data flow
//!
//! ```text
//! ┌────────────────┐    ┌──────────────────┐    ┌───────────────────┐
//! │ PortfolioStore │───▶│ ValuationEngine  │───▶│ status message    │
//! │ (stocks.json)  │    │ ReportGenerator  │───▶│ rebalance report  │
//! └────────────────┘    │ AlertEvaluator   │───▶│ combined alerts   │
//!                       └────────┬─────────┘    └─────────┬─────────┘
//!                                │                        │
//!                       ┌────────▼─────────┐    ┌─────────▼─────────┐
//!                       │ PriceResolver    │    │ Notifier (LINE,   │
//!                       │ TWSE / Yahoo     │    │ log, recording)   │
//!                       └──────────────────┘    └───────────────────┘
//! ```
//!
//! The document is re-read and every price re-queried on each operation.
//!
//! ## Price resolution
//!
//! - Valuation and reports: live quote, else the stored `current_price`,
//!   else the holding is valued at zero and flagged with ⚠️.
//! - Alerts: live quote only. A holding without one is skipped for the pass.

pub mod advisor;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod format;
pub mod model;
pub mod price;
pub mod schedule;
pub mod store;

pub use advisor::{AlertCheck, AlertMode, PortfolioAdvisor};
pub use config::{AdvisorConfig, PriceSourceMode};
pub use dispatch::{Command, CommandDispatcher};
pub use engine::{
    AlertEvaluator, AlertRecord, PriceResolver, Report, ReportGenerator, Valuation, ValuationEngine,
};
pub use error::{AdvisorError, Result};
pub use model::{Category, Holding, MonitoringRules, PortfolioDefinition, PortfolioSummary};
pub use price::{PriceQuote, PriceSource};
pub use schedule::PortfolioPass;
pub use store::{JsonFileStore, MemoryStore, PortfolioStore};
