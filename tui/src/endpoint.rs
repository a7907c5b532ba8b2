//! HTTP access to the orchestrator backend.
//!
//! [`OrchestratorEndpoint`] is the seam the submission controller talks to; the production
//! implementation is [`HttpOrchestratorClient`]. Every failure of `POST /chat` is normalized into
//! an [`OperationError`] here so callers never see transport types.

use std::error::Error as _;
use std::future::Future;

use reqwest::StatusCode;
use tracing::debug;
use tracing::warn;
use tutor_protocol::protocol::CHAT_PATH;
use tutor_protocol::protocol::ChatRequest;
use tutor_protocol::protocol::DOCS_PATH;
use tutor_protocol::protocol::HEALTH_PATH;
use tutor_protocol::protocol::HealthResponse;
use tutor_protocol::protocol::OperationError;
use tutor_protocol::protocol::OrchestrationResult;
use url::Url;

use crate::version::TUTOR_VERSION;

/// Outcome of a single orchestration call.
pub type SubmissionOutcome = Result<OrchestrationResult, OperationError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EndpointConfigError {
    #[error("invalid orchestrator base URL `{input}`: {reason}")]
    InvalidBaseUrl { input: String, reason: String },
    #[error("unsupported scheme `{scheme}` in orchestrator base URL `{input}` (expected http or https)")]
    UnsupportedScheme { input: String, scheme: String },
}

/// Where the orchestrator backend lives. Resolved once at startup and handed to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    base_url: Url,
    chat_url: Url,
    health_url: Url,
    docs_url: Url,
}

impl EndpointConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8000";

    /// Parses and validates a base URL such as `http://localhost:8000` or `https://host/api`.
    ///
    /// A path prefix on the base is kept: `https://host/api` resolves the chat endpoint to
    /// `https://host/api/chat`.
    pub fn parse(base_url: &str) -> Result<Self, EndpointConfigError> {
        let input = base_url.trim();
        let mut base = Url::parse(input).map_err(|err| EndpointConfigError::InvalidBaseUrl {
            input: input.to_string(),
            reason: err.to_string(),
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(EndpointConfigError::UnsupportedScheme {
                input: input.to_string(),
                scheme: base.scheme().to_string(),
            });
        }
        base.set_query(None);
        base.set_fragment(None);
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let join = |path: &str| {
            base.join(path)
                .map_err(|err| EndpointConfigError::InvalidBaseUrl {
                    input: input.to_string(),
                    reason: err.to_string(),
                })
        };
        Ok(Self {
            chat_url: join(CHAT_PATH)?,
            health_url: join(HEALTH_PATH)?,
            docs_url: join(DOCS_PATH)?,
            base_url: base,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn chat_url(&self) -> &Url {
        &self.chat_url
    }

    pub fn health_url(&self) -> &Url {
        &self.health_url
    }

    pub fn docs_url(&self) -> &Url {
        &self.docs_url
    }
}

/// A backend that turns a [`ChatRequest`] into an orchestration outcome.
pub trait OrchestratorEndpoint: Send + Sync + 'static {
    /// Performs exactly one attempt. No retries, no timeout.
    fn orchestrate(&self, request: ChatRequest) -> impl Future<Output = SubmissionOutcome> + Send;
}

/// [`OrchestratorEndpoint`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpOrchestratorClient {
    client: reqwest::Client,
    config: EndpointConfig,
}

impl HttpOrchestratorClient {
    pub fn new(config: EndpointConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(format!("tutor-orchestrator-client/{TUTOR_VERSION}"))
            .build()?;
        Ok(Self { client, config })
    }

    /// Queries `GET /health`.
    pub async fn health(&self) -> anyhow::Result<HealthResponse> {
        let health = self
            .client
            .get(self.config.health_url().clone())
            .send()
            .await?
            .error_for_status()?
            .json::<HealthResponse>()
            .await?;
        Ok(health)
    }
}

impl OrchestratorEndpoint for HttpOrchestratorClient {
    async fn orchestrate(&self, request: ChatRequest) -> SubmissionOutcome {
        let url = self.config.chat_url().clone();
        debug!(%url, user_id = ?request.user_id, chat_id = ?request.chat_id, "posting chat request");

        let response = match self.client.post(url).json(&request).send().await {
            Ok(response) => response,
            Err(err) => {
                let detail = error_chain_text(&err);
                warn!("chat request failed before a response: {detail}");
                return Err(OperationError::network(detail));
            }
        };

        let status = response.status();
        let body = match response.bytes().await {
            Ok(body) => body,
            Err(err) => {
                let detail = error_chain_text(&err);
                warn!("failed to read chat response body ({status}): {detail}");
                return Err(OperationError::network(detail));
            }
        };
        debug!(%status, bytes = body.len(), "chat response received");
        decode_chat_response(status, &body)
    }
}

/// Maps a raw `POST /chat` response onto the submission outcome.
pub(crate) fn decode_chat_response(status: StatusCode, body: &[u8]) -> SubmissionOutcome {
    if !status.is_success() {
        let err = OperationError::from_response_body(body, &status_text(status));
        warn!("chat request rejected with {status}: {}", err.summary());
        return Err(err);
    }

    serde_json::from_slice::<OrchestrationResult>(body).map_err(|err| {
        warn!("undecodable chat response body: {err}");
        OperationError::network(format!("invalid response body: {err}"))
    })
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(str::to_string)
        .unwrap_or_else(|| status.as_str().to_string())
}

fn error_chain_text(err: &reqwest::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::closed_local_url;
    use crate::test_support::serve_once;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tutor_protocol::UserId;

    fn request(message: &str) -> ChatRequest {
        ChatRequest {
            user_id: None,
            chat_id: None,
            message: message.to_string(),
        }
    }

    #[test]
    fn endpoint_urls_keep_base_path_prefix() {
        let config = EndpointConfig::parse("https://tutor.example.com/api").expect("parse");
        assert_eq!(config.chat_url().as_str(), "https://tutor.example.com/api/chat");
        assert_eq!(config.health_url().as_str(), "https://tutor.example.com/api/health");
        assert_eq!(config.docs_url().as_str(), "https://tutor.example.com/api/docs");

        let config = EndpointConfig::parse(" http://localhost:8000/ ").expect("parse");
        assert_eq!(config.chat_url().as_str(), "http://localhost:8000/chat");
        assert_eq!(config.base_url().as_str(), "http://localhost:8000/");
    }

    #[test]
    fn endpoint_config_rejects_bad_urls() {
        assert!(matches!(
            EndpointConfig::parse("localhost:8000/api"),
            Err(EndpointConfigError::UnsupportedScheme { .. })
        ));
        assert!(matches!(
            EndpointConfig::parse("not a url"),
            Err(EndpointConfigError::InvalidBaseUrl { .. })
        ));
        assert_eq!(
            EndpointConfig::parse("ftp://host").expect_err("should reject").to_string(),
            "unsupported scheme `ftp` in orchestrator base URL `ftp://host` (expected http or https)"
        );
    }

    #[test]
    fn decode_success_body_into_result() {
        let body = br#"{"chosen_tool":"flashcard_generator","parameters":{"topic":"derivatives"},"analysis":{},"result":{"cards":[]}}"#;
        let result = decode_chat_response(StatusCode::OK, body).expect("decode");
        assert_eq!(result.chosen_tool_token(), Some("flashcard_generator"));
        assert_eq!(result.parameters, Some(json!({"topic": "derivatives"})));
        assert_eq!(result.result, Some(json!({"cards": []})));
    }

    #[test]
    fn decode_success_body_with_non_string_tool() {
        let body = br#"{"chosen_tool":42,"parameters":{},"analysis":{},"result":{}}"#;
        let result = decode_chat_response(StatusCode::OK, body).expect("decode");
        assert_eq!(result.chosen_tool, Some(json!(42)));

        let body = br#"{"chosen_tool":{"name":"note_maker"},"parameters":{},"analysis":{},"result":{}}"#;
        let result = decode_chat_response(StatusCode::OK, body).expect("decode");
        assert_eq!(result.chosen_tool, Some(json!({"name": "note_maker"})));
        assert_eq!(result.result, Some(json!({})));
    }

    #[test]
    fn decode_non_json_success_body_as_network_error() {
        let err = decode_chat_response(StatusCode::OK, b"<html></html>").expect_err("should fail");
        assert!(err.is_network_error());
    }

    #[test]
    fn decode_error_status_without_reason_uses_numeric_code() {
        let status = StatusCode::from_u16(599).expect("status");
        let err = decode_chat_response(status, b"").expect_err("should fail");
        assert_eq!(
            serde_json::to_value(&err).expect("serialize"),
            json!({"error": "network_error", "detail": "599"})
        );
    }

    #[tokio::test]
    async fn posts_envelope_and_decodes_result() {
        let server = serve_once(
            "200 OK",
            r#"{"chosen_tool":"flashcard_generator","parameters":{"topic":"derivatives"},"analysis":{},"result":{"cards":[]}}"#,
        )
        .await;
        let client = HttpOrchestratorClient::new(
            EndpointConfig::parse(&server.base_url).expect("config"),
        )
        .expect("client");

        let mut envelope = request("Explain derivatives");
        envelope.user_id = Some(UserId::SENTINEL);
        let result = client.orchestrate(envelope).await.expect("success");
        assert_eq!(result.chosen_tool_token(), Some("flashcard_generator"));

        let captured = server.request().await;
        assert!(captured.starts_with("POST /chat HTTP/1.1"), "{captured}");
        assert_eq!(
            captured.body_json(),
            json!({"user_id": 1, "chat_id": null, "message": "Explain derivatives"})
        );
    }

    #[tokio::test]
    async fn server_error_body_becomes_operation_error() {
        let server = serve_once("500 Internal Server Error", r#"{"message":"rate_limited"}"#).await;
        let client = HttpOrchestratorClient::new(
            EndpointConfig::parse(&server.base_url).expect("config"),
        )
        .expect("client");

        let err = client
            .orchestrate(request("Explain derivatives"))
            .await
            .expect_err("should fail");
        assert_eq!(
            serde_json::to_value(&err).expect("serialize"),
            json!({"message": "rate_limited"})
        );
    }

    #[tokio::test]
    async fn non_json_error_body_falls_back_to_status_text() {
        let server = serve_once("502 Bad Gateway", "upstream exploded").await;
        let client = HttpOrchestratorClient::new(
            EndpointConfig::parse(&server.base_url).expect("config"),
        )
        .expect("client");

        let err = client
            .orchestrate(request("hello"))
            .await
            .expect_err("should fail");
        assert_eq!(
            serde_json::to_value(&err).expect("serialize"),
            json!({"error": "network_error", "detail": "Bad Gateway"})
        );
    }

    #[tokio::test]
    async fn unreachable_backend_becomes_network_error() {
        let base_url = closed_local_url().await;
        let client =
            HttpOrchestratorClient::new(EndpointConfig::parse(&base_url).expect("config"))
                .expect("client");

        let err = client
            .orchestrate(request("hello"))
            .await
            .expect_err("should fail");
        assert!(err.is_network_error());
        let detail = err
            .get("detail")
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();
        assert!(!detail.is_empty());
    }

    #[tokio::test]
    async fn health_reports_backend_status() {
        let server = serve_once("200 OK", r#"{"status":"ok"}"#).await;
        let client = HttpOrchestratorClient::new(
            EndpointConfig::parse(&server.base_url).expect("config"),
        )
        .expect("client");

        let health = client.health().await.expect("health");
        assert!(health.is_ok());
        assert!(server.request().await.starts_with("GET /health HTTP/1.1"));
    }
}
