//! HTTP server for the inbound webhook.
//!
//! One business endpoint: `POST /whatsauto`, accepting JSON or
//! form-encoded bodies from WhatsApp-automation forwarders. Business
//! failures (no match, unavailable data) always come back as HTTP 200
//! with an in-band reply; only a malformed request body gets a 400.

use axum::{
    extract::{FromRequest, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

use crate::gateway::Gateway;
use aqari_core::{config::ApiConfig, error::AqariError, message::IncomingMessage};

/// Shared state for API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub gateway: Arc<Gateway>,
    pub uptime: Instant,
    pub kb_entries: usize,
    /// "json" → `{"reply": …}`, "text" → plain-text body.
    pub response_format: String,
}

/// Inbound webhook fields. Forwarder variants disagree on the sender
/// field name, so all three are accepted.
#[derive(Debug, Deserialize)]
struct WebhookRequest {
    message: Option<String>,
    phone: Option<String>,
    sender: Option<String>,
    from: Option<String>,
}

impl WebhookRequest {
    fn sender_id(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .or(self.sender.as_deref())
            .or(self.from.as_deref())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Extractor accepting either a JSON or a form-encoded webhook body.
struct WebhookBody(WebhookRequest);

impl<S> FromRequest<S> for WebhookBody
where
    S: Send + Sync,
{
    type Rejection = (StatusCode, Json<Value>);

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_json = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("json"));

        let parsed = if is_json {
            Json::<WebhookRequest>::from_request(req, state)
                .await
                .map(|Json(body)| body)
                .map_err(|e| e.to_string())
        } else {
            Form::<WebhookRequest>::from_request(req, state)
                .await
                .map(|Form(body)| body)
                .map_err(|e| e.to_string())
        };

        parsed.map(WebhookBody).map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": format!("malformed body: {e}")})),
            )
        })
    }
}

/// `POST /whatsauto` — answer one chat message.
async fn whatsauto(
    State(state): State<ApiState>,
    WebhookBody(body): WebhookBody,
) -> Result<Response, (StatusCode, Json<Value>)> {
    let message = match body.message.as_deref().map(str::trim) {
        Some(m) if !m.is_empty() => m,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "missing 'message' field"})),
            ));
        }
    };
    let sender = body.sender_id().ok_or((
        StatusCode::BAD_REQUEST,
        Json(json!({"error": "missing sender field ('phone', 'sender' or 'from')"})),
    ))?;

    let incoming = IncomingMessage::new(sender, message);
    let outgoing = state.gateway.handle_message(&incoming).await;

    if state.response_format == "text" {
        Ok(outgoing.text.into_response())
    } else {
        Ok(Json(json!({"reply": outgoing.text})).into_response())
    }
}

/// `GET /health` — liveness with uptime and index size.
async fn health(State(state): State<ApiState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_secs": state.uptime.elapsed().as_secs(),
        "entries": state.kb_entries,
    }))
}

/// Build the axum router with shared state.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .route("/whatsauto", post(whatsauto))
        .route("/health", get(health))
        .layer(axum::extract::DefaultBodyLimit::max(1024 * 1024)) // 1 MB max request body
        .with_state(state)
}

/// Start the API server. Runs until the process exits; only bind or
/// serve failures return.
pub async fn serve(config: &ApiConfig, state: ApiState) -> Result<(), AqariError> {
    let app = build_router(state);
    let addr = format!("{}:{}", config.host, config.port);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        error!("API server failed to bind to {addr}: {e}");
        AqariError::Api(format!("failed to bind to {addr}: {e}"))
    })?;

    info!("API server listening on {addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| AqariError::Api(format!("server error: {e}")))
}
