//! # bot-core
//!
//! Transport-agnostic building blocks for the portfolio chat bot.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         bot-core                            │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐   │
//! │  │ InboundMsg   │  │  Scheduler   │──│  ScheduledJob    │   │
//! │  │ (webhook in) │  │ (timer loop) │  │  (portfolio pass)│   │
//! │  └──────────────┘  └──────────────┘  └──────────────────┘   │
//! │                    ┌──────────────────────────────────┐     │
//! │                    │ Notifier (Strategy: LINE, log …) │     │
//! │                    └──────────────────────────────────┘     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The `Notifier` trait lets the engine push text through LINE, a log sink,
//! or a test double without code changes.

pub mod error;
pub mod message;
pub mod notifier;
pub mod scheduler;

pub use error::{BotError, Result};
pub use message::InboundMessage;
pub use notifier::{LogNotifier, Notifier, RecordingNotifier, Replier};
pub use scheduler::{ScheduledJob, Scheduler, SchedulerConfig, SchedulerHandle};
