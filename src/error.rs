//! Unified error handling for ChatRelay.
//!
//! Every failure a relay request can end in is caught at the endpoint
//! boundary and converted to a structured JSON body. Non-2xx upstream
//! responses are not errors here; they flow back through the response
//! envelope with the upstream status preserved.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::fmt;

/// Unified error type for relay operations.
#[derive(Debug, Clone)]
pub enum RelayError {
    /// Caller's origin is not on the allow-list.
    OriginNotAllowed(String),
    /// Request body had no usable message list.
    InvalidMessages,
    /// Request body was not valid JSON.
    InvalidBody(String),
    /// No upstream credential configured.
    CredentialMissing,
    /// Configured credential does not carry the expected prefix.
    CredentialMalformed,
    /// Upstream request could not be completed.
    Upstream(String),
    /// Upstream responded with a payload we could not parse.
    Parse(String),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OriginNotAllowed(origin) => {
                write!(f, "Origin '{}' is not allowed", origin)
            }
            Self::InvalidMessages => {
                write!(f, "'messages' must be a non-empty array")
            }
            Self::InvalidBody(msg) => write!(f, "Invalid request body: {}", msg),
            Self::CredentialMissing => {
                write!(f, "No upstream API key is configured")
            }
            Self::CredentialMalformed => {
                write!(f, "Configured upstream API key is malformed")
            }
            Self::Upstream(msg) => write!(f, "Upstream request failed: {}", msg),
            Self::Parse(msg) => write!(f, "Failed to parse upstream response: {}", msg),
        }
    }
}

impl std::error::Error for RelayError {}

/// Error response structure for JSON serialization.
#[derive(Serialize)]
struct ErrorResponseBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    message: String,
    r#type: String,
}

impl RelayError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::OriginNotAllowed(_) => StatusCode::FORBIDDEN,
            Self::InvalidMessages => StatusCode::BAD_REQUEST,
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
            Self::CredentialMissing => StatusCode::INTERNAL_SERVER_ERROR,
            Self::CredentialMalformed => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Parse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::OriginNotAllowed(_) => "origin_forbidden",
            Self::InvalidMessages => "invalid_request",
            Self::InvalidBody(_) => "invalid_request",
            Self::CredentialMissing => "configuration_error",
            Self::CredentialMalformed => "configuration_error",
            Self::Upstream(_) => "proxy_error",
            Self::Parse(_) => "proxy_error",
        }
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponseBody {
            error: ErrorDetail {
                message: self.to_string(),
                r#type: self.error_type().to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}
