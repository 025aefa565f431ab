//! HTTP handlers for the relay API.

use super::types::*;
use super::AppState;
use crate::config::{self, Config, RelayConfig};
use crate::cors;
use crate::error::RelayError;
use crate::http::{create_client, create_streaming_client};
use crate::logger::{self, RelayOutcome};
use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures::StreamExt;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

// ============================================================================
// Health and status handlers
// ============================================================================

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        app: "chatrelay",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// CORS preflight. The middleware attaches the actual grant headers.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

pub async fn relay_status(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Json<RelayStatusResponse> {
    let origin = cors::request_origin(&headers);
    let granted = cors::resolve_origin(origin.as_deref(), &state.config.relay).to_string();

    Json(RelayStatusResponse {
        status: "ok",
        has_key: state.config.credential().is_some(),
        origin: granted,
    })
}

// ============================================================================
// Relay helpers
// ============================================================================

/// Gate a request on its declared origin. Absent counts as not allow-listed.
pub fn check_origin(origin: Option<&str>, relay: &RelayConfig) -> Result<String, RelayError> {
    match origin {
        Some(o) if cors::is_allowed(o, relay) => Ok(o.to_string()),
        Some(o) => Err(RelayError::OriginNotAllowed(o.to_string())),
        None => Err(RelayError::OriginNotAllowed("<missing>".to_string())),
    }
}

/// Require a configured, well-formed credential before anything goes upstream.
pub fn require_credential(config: &Config) -> Result<&str, RelayError> {
    let key = config.credential().ok_or(RelayError::CredentialMissing)?;
    if !config::is_well_formed_key(key) {
        return Err(RelayError::CredentialMalformed);
    }
    Ok(key)
}

/// Parse and validate the inbound body in one step.
pub fn parse_chat_request(body: &[u8]) -> Result<ChatRequest, RelayError> {
    let request: ChatRequest =
        serde_json::from_slice(body).map_err(|e| RelayError::InvalidBody(e.to_string()))?;

    if request.messages.is_empty() {
        return Err(RelayError::InvalidMessages);
    }

    Ok(request)
}

/// Build the upstream request body with defaults and tuning knobs applied.
pub fn build_upstream_body(request: &ChatRequest, relay: &RelayConfig) -> serde_json::Value {
    let model = request.model.as_deref().unwrap_or(&relay.default_model);

    serde_json::json!({
        "model": model,
        "messages": request.messages,
        "stream": request.stream,
        "max_tokens": relay.max_tokens,
        "temperature": relay.temperature,
        "top_p": relay.top_p,
        "repetition_penalty": relay.repetition_penalty,
    })
}

fn log_relay(
    state: &AppState,
    id: Uuid,
    origin: &str,
    model: &str,
    status: u16,
    started: Instant,
    streamed: bool,
) {
    let outcome = RelayOutcome {
        origin: origin.to_string(),
        model: model.to_string(),
        status,
        duration_ms: started.elapsed().as_millis() as u64,
        streamed,
    };
    tracing::info!(
        id = %id,
        "{}",
        logger::format_outcome(&outcome, &state.config.app.log_verbosity)
    );
}

fn fail(
    state: &AppState,
    id: Uuid,
    origin: &str,
    model: &str,
    started: Instant,
    error: RelayError,
) -> Response {
    tracing::warn!(id = %id, "relay failed: {}", error);
    log_relay(state, id, origin, model, error.status_code().as_u16(), started, false);
    error.into_response()
}

// ============================================================================
// Relay handler
// ============================================================================

pub async fn relay(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    let id = Uuid::new_v4();
    let config = &state.config;

    let declared = cors::request_origin(&headers);
    let origin_label = declared.as_deref().unwrap_or("-").to_string();

    // 1. Origin gate: unlisted callers never reach upstream.
    let origin = match check_origin(declared.as_deref(), &config.relay) {
        Ok(o) => o,
        Err(e) => return fail(&state, id, &origin_label, "-", started, e),
    };

    // 2. Credential gate.
    let api_key = match require_credential(config) {
        Ok(key) => key,
        Err(e) => return fail(&state, id, &origin, "-", started, e),
    };

    // 3. Body validation with defaulting.
    let request = match parse_chat_request(&body) {
        Ok(r) => r,
        Err(e) => return fail(&state, id, &origin, "-", started, e),
    };

    let model = request
        .model
        .clone()
        .unwrap_or_else(|| config.relay.default_model.clone());
    let upstream_body = build_upstream_body(&request, &config.relay);

    // 4. Forward. Single attempt, no retries.
    let client = if request.stream {
        create_streaming_client()
    } else {
        create_client()
    };

    let send = client
        .post(&config.relay.upstream_url)
        .header("Authorization", format!("Bearer {}", api_key))
        .header("Content-Type", "application/json")
        .header("HTTP-Referer", &config.relay.referer)
        .header("X-Title", &config.relay.title)
        .json(&upstream_body)
        .send()
        .await;

    let response = match send {
        Ok(r) => r,
        Err(e) => {
            return fail(
                &state,
                id,
                &origin,
                &model,
                started,
                RelayError::Upstream(e.to_string()),
            )
        }
    };

    let status = response.status();

    // 5a. Streaming: relay bytes as they arrive, never buffer.
    if request.stream {
        log_relay(&state, id, &origin, &model, status.as_u16(), started, true);

        let stream = response
            .bytes_stream()
            .map(|result| result.map_err(std::io::Error::other));
        let body = Body::from_stream(stream);

        return Response::builder()
            .status(StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::OK))
            .header("Content-Type", "text/event-stream")
            .header("Cache-Control", "no-cache")
            .header("Connection", "keep-alive")
            .body(body)
            .unwrap()
            .into_response();
    }

    // 5b. Buffered: wrap the upstream payload, preserving its status.
    let text = match response.text().await {
        Ok(t) => t,
        Err(e) => {
            return fail(
                &state,
                id,
                &origin,
                &model,
                started,
                RelayError::Upstream(e.to_string()),
            )
        }
    };

    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(payload) => {
            log_relay(&state, id, &origin, &model, status.as_u16(), started, false);

            let envelope = Envelope::from_upstream(status.as_u16(), payload);
            (
                StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::OK),
                Json(envelope),
            )
                .into_response()
        }
        Err(e) => {
            let snippet: String = text.chars().take(500).collect();
            fail(
                &state,
                id,
                &origin,
                &model,
                started,
                RelayError::Parse(format!("{} | Response: {}", e, snippet)),
            )
        }
    }
}
