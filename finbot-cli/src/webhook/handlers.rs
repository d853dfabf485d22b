use axum::{
    Json,
    body::Bytes,
    extract::State,
    response::{Html, IntoResponse},
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::error::{ApiError, Result};
use super::router::AppState;
use crate::telegram::Update;

pub const SERVICE_NAME: &str = "Finance Controller Bot";

const HOME_PAGE: &str = r#"<!doctype html>
<html lang="pt-BR">
<head><meta charset="utf-8"><title>Finance Controller Bot</title></head>
<body>
<h1>🤖 Finance Controller Bot</h1>
<p><strong>Status:</strong> ✅ Online (Webhook Mode)</p>
<p><strong>Endpoints:</strong></p>
<ul>
  <li><code>/health</code> - Health check</li>
  <li><code>/webhook</code> - Webhook do Telegram</li>
</ul>
<p><em>Bot funcionando em modo webhook.</em></p>
</body>
</html>
"#;

/// GET /
pub async fn home() -> impl IntoResponse {
    Html(HOME_PAGE)
}

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "mode": "webhook",
        "build": state.build,
    }))
}

/// POST /webhook
/// The update is handled before responding, so Telegram only sees 200
/// once the replies have been sent.
pub async fn webhook(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let update: Update = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "rejecting malformed update");
        ApiError::BadPayload(e)
    })?;

    tracing::debug!(update_id = update.update_id, "webhook update");
    state
        .dispatcher
        .handle_update(&update, state.chat.as_ref())
        .await;

    Ok(Json(json!({ "status": "ok" })))
}

#[derive(Debug, Deserialize)]
pub struct SetWebhookRequest {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

/// POST /set_webhook
pub async fn set_webhook(State(state): State<AppState>, body: Bytes) -> Result<Json<Value>> {
    let request: SetWebhookRequest = serde_json::from_slice(&body)?;
    let url = request
        .webhook_url
        .filter(|u| !u.trim().is_empty())
        .ok_or(ApiError::MissingWebhookUrl)?;

    state.chat.set_webhook(&url).await.map_err(|e| {
        tracing::error!(error = %e, "setWebhook failed");
        ApiError::Upstream(e.to_string())
    })?;

    tracing::info!(%url, "webhook registered");
    Ok(Json(json!({
        "status": "webhook_set",
        "url": url,
    })))
}
