//! HTTP Handlers

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
};
use serde::Serialize;

use line_messaging::{SIGNATURE_HEADER, WebhookPayload};

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub messaging_configured: bool,
    pub portfolio_path: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl Into<String>, code: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
            code: code.into(),
        }),
    )
}

// ============================================================================
// Handlers
// ============================================================================

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        messaging_configured: state.webhook.is_some(),
        portfolio_path: state.portfolio_path.clone(),
    })
}

/// LINE webhook
///
/// Verifies the signature over the raw body, then answers every text
/// message with exactly one reply.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let webhook = state.webhook.as_ref().ok_or_else(|| {
        api_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "Messaging not configured",
            "MESSAGING_DISABLED",
        )
    })?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| api_error(StatusCode::BAD_REQUEST, "Missing LINE signature", "MISSING_SIGNATURE"))?;

    webhook.verifier.verify(&body, signature).map_err(|e| {
        tracing::warn!("Webhook signature failed: {}", e);
        api_error(StatusCode::BAD_REQUEST, e.user_message(), "INVALID_SIGNATURE")
    })?;

    let payload = WebhookPayload::parse(&body).map_err(|e| {
        tracing::warn!("Webhook payload rejected: {}", e);
        api_error(StatusCode::BAD_REQUEST, e.user_message(), "INVALID_PAYLOAD")
    })?;

    for message in payload.text_messages() {
        let reply = state.dispatcher.handle(&message).await;
        match message.reply_token.as_deref() {
            Some(token) => {
                webhook.replier.reply(token, &reply).await;
            }
            None => tracing::warn!("Text message without reply token, reply dropped"),
        }
    }

    Ok(StatusCode::OK)
}
