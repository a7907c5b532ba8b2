//! Request and response bodies exchanged with the orchestrator backend.
//!
//! The client speaks exactly one contract: `POST <base>/chat` with a [`ChatRequest`] body,
//! answered by an [`OrchestrationResult`] on success or an error body that is normalized into an
//! [`OperationError`].

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;

use crate::ChatId;
use crate::UserId;

/// Path (relative to the configured base URL) of the orchestration endpoint.
pub const CHAT_PATH: &str = "chat";
/// Path of the liveness probe.
pub const HEALTH_PATH: &str = "health";
/// Path of the backend's interactive API docs. Only ever shown as a link.
pub const DOCS_PATH: &str = "docs";

/// `error` value used for failures synthesized on the client side.
pub const NETWORK_ERROR_CODE: &str = "network_error";

/// Body of `POST /chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub user_id: Option<UserId>,
    pub chat_id: Option<ChatId>,
    pub message: String,
}

/// Successful response of `POST /chat`.
///
/// Every field is optional and untyped so that any payload the backend sends still decodes; the
/// presenter renders missing fields as `undefined`. A field that is present but `null` decodes to
/// `Some(Value::Null)`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub chosen_tool: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub parameters: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub analysis: Option<Value>,
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub result: Option<Value>,
}

impl OrchestrationResult {
    /// The chosen tool when the backend sent it as a plain string token.
    pub fn chosen_tool_token(&self) -> Option<&str> {
        self.chosen_tool.as_ref().and_then(Value::as_str)
    }
}

fn present_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Normalized failure of a submission.
///
/// Either the backend's own JSON error body, kept verbatim, or the client-side fallback
/// `{"error": "network_error", "detail": "..."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationError(Map<String, Value>);

impl OperationError {
    /// Failure where no usable response body exists (transport error, unparseable body).
    pub fn network(detail: impl Into<String>) -> Self {
        let mut map = Map::new();
        map.insert(
            "error".to_string(),
            Value::String(NETWORK_ERROR_CODE.to_string()),
        );
        map.insert("detail".to_string(), Value::String(detail.into()));
        Self(map)
    }

    /// Wraps a decoded error body. Non-object bodies are placed under `message`.
    pub fn from_body(body: Value) -> Self {
        match body {
            Value::Object(map) => Self(map),
            other => {
                let mut map = Map::new();
                map.insert("message".to_string(), other);
                Self(map)
            }
        }
    }

    /// Decodes the raw body of a non-2xx response, falling back to a network error carrying
    /// `status_text` when the body is empty or not JSON.
    pub fn from_response_body(body: &[u8], status_text: &str) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(value) => Self::from_body(value),
            Err(_) => Self::network(status_text),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_network_error(&self) -> bool {
        self.get("error").and_then(Value::as_str) == Some(NETWORK_ERROR_CODE)
    }

    /// One-line human-readable description, preferring `message`, then `detail`, then `error`.
    pub fn summary(&self) -> String {
        if self.is_network_error() {
            let detail = self.get("detail").map(value_as_text).unwrap_or_default();
            return format!("network error: {detail}");
        }
        ["message", "detail", "error"]
            .into_iter()
            .find_map(|key| self.get(key).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| Value::Object(self.0.clone()).to_string())
    }

    /// The error body pretty-printed with two-space indentation.
    pub fn to_pretty_json(&self) -> String {
        serde_json::to_string_pretty(&self.0)
            .unwrap_or_else(|_| Value::Object(self.0.clone()).to_string())
    }
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

impl HealthResponse {
    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn chat_request_serializes_unset_ids_as_null() {
        let request = ChatRequest {
            user_id: None,
            chat_id: None,
            message: "Explain derivatives".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).expect("serialize"),
            json!({"user_id": null, "chat_id": null, "message": "Explain derivatives"})
        );
    }

    #[test]
    fn chat_request_serializes_assigned_ids_as_integers() {
        let request = ChatRequest {
            user_id: Some(UserId::new(3)),
            chat_id: Some(ChatId::SENTINEL),
            message: "hi".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&request).expect("serialize"),
            json!({"user_id": 3, "chat_id": 1, "message": "hi"})
        );
    }

    #[test]
    fn orchestration_result_distinguishes_missing_from_null() {
        let decoded: OrchestrationResult =
            serde_json::from_value(json!({"chosen_tool": "note_maker", "analysis": null}))
                .expect("decode");
        assert_eq!(
            decoded,
            OrchestrationResult {
                chosen_tool: Some(json!("note_maker")),
                parameters: None,
                analysis: Some(Value::Null),
                result: None,
            }
        );
    }

    #[test]
    fn orchestration_result_accepts_non_string_tool() {
        let decoded: OrchestrationResult =
            serde_json::from_value(json!({"chosen_tool": {"name": "note_maker"}})).expect("decode");
        assert_eq!(decoded.chosen_tool, Some(json!({"name": "note_maker"})));
        assert_eq!(decoded.chosen_tool_token(), None);

        let decoded: OrchestrationResult =
            serde_json::from_value(json!({"chosen_tool": "note_maker"})).expect("decode");
        assert_eq!(decoded.chosen_tool_token(), Some("note_maker"));
    }

    #[test]
    fn orchestration_result_preserves_payload_key_order() -> anyhow::Result<()> {
        let body = r#"{"chosen_tool":"note_maker","parameters":{"topic":"x","subject":"y","a":1},"analysis":{},"result":{}}"#;
        let decoded: OrchestrationResult = serde_json::from_str(body)?;
        let keys: Vec<&str> = decoded
            .parameters
            .as_ref()
            .and_then(Value::as_object)
            .map(|map| map.keys().map(String::as_str).collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["topic", "subject", "a"]);
        Ok(())
    }

    #[test]
    fn operation_error_keeps_structured_body_verbatim() {
        let err = OperationError::from_response_body(
            br#"{"message":"rate_limited"}"#,
            "Internal Server Error",
        );
        assert_eq!(
            serde_json::to_value(&err).expect("serialize"),
            json!({"message": "rate_limited"})
        );
        assert_eq!(err.summary(), "rate_limited");
        assert!(!err.is_network_error());
    }

    #[test]
    fn operation_error_falls_back_to_status_text_for_non_json_body() {
        let err = OperationError::from_response_body(b"<html>bad gateway</html>", "Bad Gateway");
        assert_eq!(
            serde_json::to_value(&err).expect("serialize"),
            json!({"error": "network_error", "detail": "Bad Gateway"})
        );
        assert_eq!(err.summary(), "network error: Bad Gateway");
    }

    #[test]
    fn operation_error_falls_back_for_empty_body() {
        let err = OperationError::from_response_body(b"", "Service Unavailable");
        assert!(err.is_network_error());
    }

    #[test]
    fn operation_error_wraps_non_object_body_under_message() {
        let err = OperationError::from_body(json!("overloaded"));
        assert_eq!(
            serde_json::to_value(&err).expect("serialize"),
            json!({"message": "overloaded"})
        );
    }

    #[test]
    fn operation_error_summary_uses_fastapi_detail() {
        let err = OperationError::from_body(json!({"detail": "Not Found"}));
        assert_eq!(err.summary(), "Not Found");

        let err = OperationError::from_body(json!({"detail": [{"loc": ["body", "message"]}]}));
        assert_eq!(err.summary(), r#"{"detail":[{"loc":["body","message"]}]}"#);
    }

    #[test]
    fn operation_error_pretty_json_uses_two_space_indent() {
        let err = OperationError::network("connection refused");
        assert_eq!(
            err.to_pretty_json(),
            "{\n  \"error\": \"network_error\",\n  \"detail\": \"connection refused\"\n}"
        );
    }
}
