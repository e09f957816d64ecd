//! Response body handling.
//!
//! Most endpoints wrap their payload in an envelope:
//! ```json
//! { "status": "success", "data": { ... }, "timestamp": "2024-05-01T10:00:00" }
//! ```
//! Some return the payload bare. Error bodies carry `detail` (string or a
//! list of validation errors) or `message`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use wl_core::error::{WlError, WlResult};

/// Standard response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T = Value> {
    /// Either a label ("success") or a numeric code, depending on the endpoint.
    pub status: Value,
    pub data: T,
    #[serde(default)]
    pub timestamp: Option<Value>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        match &self.status {
            Value::String(s) => s == "success" || s == "ok",
            Value::Number(n) => n.as_u64().is_some_and(|code| (200..300).contains(&code)),
            Value::Bool(b) => *b,
            _ => false,
        }
    }
}

/// Whether a JSON object looks like an envelope rather than a bare payload.
fn is_envelope(value: &Value) -> bool {
    value
        .as_object()
        .is_some_and(|obj| obj.contains_key("status") && obj.contains_key("data"))
}

/// Strip the envelope (if any) and return the payload.
pub fn unwrap_payload(value: Value) -> Value {
    if is_envelope(&value) {
        if let Value::Object(mut obj) = value {
            return obj.remove("data").unwrap_or(Value::Null);
        }
        return Value::Null;
    }
    value
}

/// Parse a response body into `T`, accepting enveloped and bare bodies.
/// An empty body is treated as JSON `null`.
pub fn parse_body<T: DeserializeOwned>(body: &str) -> WlResult<T> {
    let value: Value = if body.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(body)
            .map_err(|e| WlError::Serialization(format!("invalid response body: {e}")))?
    };
    serde_json::from_value(unwrap_payload(value))
        .map_err(|e| WlError::Serialization(format!("unexpected response shape: {e}")))
}

/// Extract the server's error detail from an error body.
pub fn error_detail(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.trim().to_string();
    };
    match value.get("detail") {
        Some(Value::String(detail)) => return detail.clone(),
        Some(Value::Array(errors)) => {
            let messages: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("msg").and_then(Value::as_str))
                .collect();
            if !messages.is_empty() {
                return messages.join("; ");
            }
        }
        _ => {}
    }
    value
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
