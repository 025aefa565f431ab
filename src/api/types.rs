//! Request and response types for the relay API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub app: &'static str,
    pub version: &'static str,
}

/// Status-check response: whether a credential is configured, never its value.
#[derive(Serialize)]
pub struct RelayStatusResponse {
    pub status: &'static str,
    #[serde(rename = "hasKey")]
    pub has_key: bool,
    /// The origin the CORS layer would grant this caller.
    pub origin: String,
}

/// Inbound chat request after defaulting rules are applied.
///
/// A missing `messages` field deserializes to an empty list so validation can
/// reject absence and emptiness the same way instead of crashing.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub stream: bool,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// Normalized wrapper around a buffered upstream response.
#[derive(Serialize)]
pub struct Envelope {
    pub status: u16,
    pub success: bool,
    pub data: Option<Value>,
    pub error: Option<Value>,
}

impl Envelope {
    /// Wrap a fully-buffered upstream payload, preserving its status.
    ///
    /// On failure the upstream `error` field is surfaced; when the upstream
    /// omits one, the whole payload stands in so `error` is never null on a
    /// failed call.
    pub fn from_upstream(status: u16, payload: Value) -> Self {
        let success = (200..300).contains(&status);
        if success {
            Self {
                status,
                success,
                data: Some(payload),
                error: None,
            }
        } else {
            let error = match payload.get("error") {
                Some(e) => e.clone(),
                None => payload,
            };
            Self {
                status,
                success,
                data: None,
                error: Some(error),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_request_applies_defaults() {
        let request: ChatRequest = serde_json::from_value(json!({})).unwrap();

        assert!(request.messages.is_empty());
        assert_eq!(request.model, None);
        assert!(!request.stream);
    }

    #[test]
    fn chat_request_parses_full_body() {
        let request: ChatRequest = serde_json::from_value(json!({
            "messages": [{"role": "user", "content": "Hello"}],
            "model": "openai/gpt-4o-mini",
            "stream": true
        }))
        .unwrap();

        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, "user");
        assert_eq!(request.model.as_deref(), Some("openai/gpt-4o-mini"));
        assert!(request.stream);
    }

    #[test]
    fn chat_request_rejects_non_array_messages() {
        let result = serde_json::from_value::<ChatRequest>(json!({"messages": "hi"}));
        assert!(result.is_err());
    }

    #[test]
    fn envelope_wraps_success_payload() {
        let payload = json!({"choices": [{"message": {"content": "hello"}}]});
        let envelope = Envelope::from_upstream(200, payload.clone());

        assert_eq!(envelope.status, 200);
        assert!(envelope.success);
        assert_eq!(envelope.data, Some(payload));
        assert_eq!(envelope.error, None);
    }

    #[test]
    fn envelope_surfaces_upstream_error_field() {
        let payload = json!({"error": {"message": "rate limited", "code": 429}});
        let envelope = Envelope::from_upstream(429, payload);

        assert_eq!(envelope.status, 429);
        assert!(!envelope.success);
        assert_eq!(envelope.data, None);
        assert_eq!(
            envelope.error,
            Some(json!({"message": "rate limited", "code": 429}))
        );
    }

    #[test]
    fn envelope_falls_back_to_whole_payload_without_error_field() {
        let payload = json!({"detail": "not found"});
        let envelope = Envelope::from_upstream(404, payload.clone());

        assert!(!envelope.success);
        assert_eq!(envelope.error, Some(payload));
    }

    #[test]
    fn envelope_serializes_null_fields_explicitly() {
        let envelope = Envelope::from_upstream(200, json!({"ok": true}));
        let serialized = serde_json::to_value(&envelope).unwrap();

        assert_eq!(serialized["error"], Value::Null);
        assert_eq!(serialized["success"], json!(true));
    }
}
