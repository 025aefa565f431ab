//! Origin allow-listing and CORS response headers.
//!
//! Every response carries the same four headers: the allow-origin is the
//! caller's origin when it is on the allow-list, and the configured fallback
//! origin for everyone else (including requests with no `Origin` at all).
//! That reflect-or-fallback rule is why this is hand-rolled rather than a
//! `tower_http::cors::CorsLayer`, which can only omit the header for
//! unlisted origins.

use crate::config::{Config, RelayConfig};
use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

pub const ALLOW_METHODS: &str = "POST, GET, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// Whether an origin is on the allow-list. Exact string comparison.
pub fn is_allowed(origin: &str, relay: &RelayConfig) -> bool {
    relay.allowed_origins.iter().any(|o| o == origin)
}

/// The origin to grant in `Access-Control-Allow-Origin`.
pub fn resolve_origin<'a>(origin: Option<&'a str>, relay: &'a RelayConfig) -> &'a str {
    match origin {
        Some(o) if is_allowed(o, relay) => o,
        _ => &relay.fallback_origin,
    }
}

/// Extract the caller's declared origin from request headers.
pub fn request_origin(headers: &axum::http::HeaderMap) -> Option<String> {
    headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

/// Middleware stamping CORS headers onto every response, error paths included.
pub async fn apply(
    State(config): State<Arc<Config>>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request_origin(request.headers());

    let mut response = next.run(request).await;

    let granted = resolve_origin(origin.as_deref(), &config.relay);
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(granted) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
    }
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(header::VARY, HeaderValue::from_static("Origin"));

    response
}
