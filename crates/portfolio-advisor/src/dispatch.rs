//! Chat command dispatch
//!
//! Commands are matched case-sensitively after trimming. Every inbound
//! message gets exactly one reply.
//!
//! | Command          | Alias      | Reply                               |
//! |------------------|------------|-------------------------------------|
//! | `status`         | `投資組合` | current valuation                   |
//! | `report`         | `報表`     | rebalancing report                  |
//! | `check-alerts`   | `檢查警戒` | acknowledgement (alerts are pushed) |
//! | `lookup <sym>`   | `查詢`     | live price of one ticker            |
//! | `help`           | `幫助`     | command list                        |

use bot_core::InboundMessage;
use std::sync::Arc;

use crate::advisor::{AlertMode, PortfolioAdvisor};

pub const HELP_TEXT: &str = "📱 Portfolio bot commands:\n\n\
    • status - current portfolio value\n\
    • report - rebalancing report with buy/sell suggestions\n\
    • check-alerts - check every holding against its alert prices\n\
    • lookup [ticker] - live price of one ticker\n\
    • help - show this message";

pub const UNKNOWN_COMMAND_REPLY: &str =
    "Sorry, I don't understand that command. Send \"help\" to see what I can do.";

pub const MISSING_SYMBOL_REPLY: &str = "Please give a ticker to look up, e.g. \"lookup 2330\".";

const LOOKUP_KEYWORDS: [&str; 2] = ["lookup", "查詢"];

/// A parsed inbound command
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Status,
    Report,
    CheckAlerts,
    Lookup(String),
    /// Lookup keyword with nothing after it
    LookupMissingSymbol,
    Help,
    Unknown,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match text {
            "status" | "投資組合" => return Self::Status,
            "report" | "報表" => return Self::Report,
            "check-alerts" | "檢查警戒" => return Self::CheckAlerts,
            "help" | "幫助" => return Self::Help,
            _ => {}
        }

        for keyword in LOOKUP_KEYWORDS {
            if let Some(rest) = text.strip_prefix(keyword) {
                let symbol = rest.trim();
                return if symbol.is_empty() {
                    Self::LookupMissingSymbol
                } else {
                    Self::Lookup(symbol.to_string())
                };
            }
        }

        Self::Unknown
    }

    /// Short name for logs
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Status => "status",
            Self::Report => "report",
            Self::CheckAlerts => "check-alerts",
            Self::Lookup(_) | Self::LookupMissingSymbol => "lookup",
            Self::Help => "help",
            Self::Unknown => "unknown",
        }
    }
}

/// Turns inbound chat text into a reply
#[derive(Clone)]
pub struct CommandDispatcher {
    advisor: Arc<PortfolioAdvisor>,
}

impl CommandDispatcher {
    pub const fn new(advisor: Arc<PortfolioAdvisor>) -> Self {
        Self { advisor }
    }

    /// Handle one message and produce its reply
    pub async fn handle(&self, message: &InboundMessage) -> String {
        let command = Command::parse(message.command_text());
        tracing::info!(
            command = command.kind(),
            sender = message.sender_id.as_deref().unwrap_or("-"),
            "Handling command"
        );
        self.execute(command).await
    }

    pub async fn execute(&self, command: Command) -> String {
        match command {
            Command::Status => self.advisor.status_message().await,
            Command::Report => self.advisor.report_message().await,
            Command::CheckAlerts => self.advisor.check_alerts(AlertMode::Manual).await.acknowledgement(),
            Command::Lookup(symbol) => self.advisor.lookup_message(&symbol).await,
            Command::LookupMissingSymbol => MISSING_SYMBOL_REPLY.into(),
            Command::Help => HELP_TEXT.into(),
            Command::Unknown => UNKNOWN_COMMAND_REPLY.into(),
        }
    }
}
