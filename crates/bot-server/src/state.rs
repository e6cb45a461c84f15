//! Application State

use std::sync::Arc;

use bot_core::Replier;
use line_messaging::SignatureVerifier;
use portfolio_advisor::CommandDispatcher;

/// What the webhook needs from the messaging transport
pub struct LineWebhook {
    pub verifier: SignatureVerifier,
    pub replier: Arc<dyn Replier>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Turns chat text into replies
    pub dispatcher: CommandDispatcher,

    /// Webhook transport (None if LINE is not configured)
    pub webhook: Option<Arc<LineWebhook>>,

    /// Portfolio document location (reported by /health)
    pub portfolio_path: String,
}
