//! portfolio-watch HTTP Server
//!
//! Axum server hosting the LINE webhook, plus the background scheduler that
//! pushes status messages and threshold alerts.

mod config;
mod handlers;
mod state;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bot_core::{LogNotifier, Notifier, Replier, Scheduler, SchedulerConfig};
use line_messaging::{LineClient, LineConfig};
use portfolio_advisor::{
    AdvisorConfig, CommandDispatcher, JsonFileStore, PortfolioAdvisor, PortfolioPass, PortfolioStore,
    PriceResolver,
};

use crate::config::ServerConfig;
use crate::handlers::{callback, health_check};
use crate::state::{AppState, LineWebhook};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let server_config = ServerConfig::from_env()?;
    let advisor_config = AdvisorConfig::from_env()?;
    let scheduler_config = SchedulerConfig::from_env()?;

    // Portfolio storage and quotes
    let store: Arc<dyn PortfolioStore> = Arc::new(JsonFileStore::new(&advisor_config.portfolio_path));
    let initial = store.load().await;
    tracing::info!(
        path = %advisor_config.portfolio_path.display(),
        categories = initial.categories.len(),
        holdings = initial.holding_count(),
        "Portfolio loaded"
    );

    let source = advisor_config.build_price_source()?;
    tracing::info!(
        source = source.name(),
        mode = ?advisor_config.price_source,
        timeout_secs = advisor_config.lookup_timeout.as_secs(),
        "Price source ready"
    );
    let resolver = PriceResolver::new(source, advisor_config.lookup_timeout);

    // Messaging
    let line = match LineConfig::from_env() {
        Ok(config) => {
            tracing::info!("✓ LINE configured");
            Some(Arc::new(LineClient::new(config)?))
        }
        Err(e) => {
            tracing::warn!("⚠ LINE not configured - webhook disabled, notifications go to the log");
            tracing::warn!("  {}", e);
            None
        }
    };

    let notifier: Arc<dyn Notifier> = match &line {
        Some(client) => client.clone(),
        None => Arc::new(LogNotifier),
    };
    let webhook = line.as_ref().map(|client| {
        let replier: Arc<dyn Replier> = client.clone();
        Arc::new(LineWebhook {
            verifier: client.verifier().clone(),
            replier,
        })
    });

    let advisor = Arc::new(PortfolioAdvisor::new(store.clone(), resolver, notifier));

    // Periodic pass
    let mut scheduler = Scheduler::new(scheduler_config);
    scheduler.register(PortfolioPass::new(advisor.clone(), store));
    let scheduler = scheduler.start();

    // Build application state
    let state = AppState {
        dispatcher: CommandDispatcher::new(advisor),
        webhook,
        portfolio_path: advisor_config.portfolio_path.display().to_string(),
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health_check))
        .route("/callback", post(callback))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(server_config.bind_addr).await?;

    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("🚀 portfolio-watch running on http://{}", server_config.bind_addr);
    tracing::info!("══════════════════════════════════════════════════");
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health   - Health check");
    tracing::info!("  POST /callback - LINE webhook");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown().await;
    tracing::info!("Shut down cleanly");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
