//! ChatRelay - Credential-hiding relay between browser chat frontends and OpenRouter.
//!
//! Features:
//! - Single relay endpoint with origin allow-listing and a fixed CORS fallback
//! - Server-held API key injection (the key never reaches the client)
//! - Byte-for-byte streaming passthrough for `stream: true` requests
//! - Normalized `{status, success, data, error}` envelope for buffered calls
//! - Redacted credential logging

pub mod api;
pub mod config;
pub mod cors;
pub mod error;
pub mod http;
pub mod logger;
