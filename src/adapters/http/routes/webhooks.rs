//! Payment-provider webhook route.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
};
use secrecy::ExposeSecret;
use serde_json::Value as JsonValue;

use crate::{
    adapters::http::app_state::AppState,
    app_error::{AppError, AppResult},
};

/// Header the provider sends its shared secret in.
const WEBHOOK_TOKEN_HEADER: &str = "x-hotmart-hottok";

/// POST /api/webhooks/payment
///
/// Acknowledges with 200 whenever the record merge succeeded; the ack body
/// carries the role-sync outcome so a failed downstream mutation is visible
/// without failing the webhook.
async fn handle_payment_webhook(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<JsonValue>,
) -> AppResult<impl IntoResponse> {
    let provided = headers
        .get(WEBHOOK_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let expected = app_state.config.webhook_token.expose_secret();
    if expected.is_empty() || provided != expected {
        return Err(AppError::Unauthorized);
    }

    let outcome = app_state
        .subscription_use_cases
        .handle_payload(&payload)
        .await?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({ "ok": true, "role_sync": outcome.role_sync })),
    ))
}

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/payment", post(handle_payment_webhook))
}
