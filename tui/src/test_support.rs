//! Test doubles for the orchestrator backend.

use std::collections::VecDeque;
use std::fmt;
use std::ops::Deref;
use std::sync::Mutex;

use serde_json::json;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tutor_protocol::protocol::ChatRequest;
use tutor_protocol::protocol::OperationError;
use tutor_protocol::protocol::OrchestrationResult;

use crate::endpoint::OrchestratorEndpoint;
use crate::endpoint::SubmissionOutcome;

/// Endpoint that replays scripted outcomes and records every request it receives.
#[derive(Debug, Default)]
pub(crate) struct StubEndpoint {
    outcomes: Mutex<VecDeque<SubmissionOutcome>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl StubEndpoint {
    pub(crate) fn with_outcomes(outcomes: impl IntoIterator<Item = SubmissionOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

impl OrchestratorEndpoint for StubEndpoint {
    async fn orchestrate(&self, request: ChatRequest) -> SubmissionOutcome {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
        self.outcomes
            .lock()
            .ok()
            .and_then(|mut outcomes| outcomes.pop_front())
            .unwrap_or_else(|| Err(OperationError::network("stub endpoint has no scripted outcome")))
    }
}

/// Endpoint whose single request blocks until the test releases it through [`Gate`].
#[derive(Debug)]
pub(crate) struct GatedEndpoint {
    started: Mutex<Option<oneshot::Sender<()>>>,
    release: Mutex<Option<oneshot::Receiver<SubmissionOutcome>>>,
}

pub(crate) struct Gate {
    /// Fires once the request reached the endpoint.
    pub(crate) started: oneshot::Receiver<()>,
    pub(crate) release: oneshot::Sender<SubmissionOutcome>,
}

impl GatedEndpoint {
    pub(crate) fn new() -> (Self, Gate) {
        let (started_tx, started_rx) = oneshot::channel();
        let (release_tx, release_rx) = oneshot::channel();
        let endpoint = Self {
            started: Mutex::new(Some(started_tx)),
            release: Mutex::new(Some(release_rx)),
        };
        let gate = Gate {
            started: started_rx,
            release: release_tx,
        };
        (endpoint, gate)
    }
}

impl OrchestratorEndpoint for GatedEndpoint {
    async fn orchestrate(&self, _request: ChatRequest) -> SubmissionOutcome {
        let started = self.started.lock().ok().and_then(|mut started| started.take());
        if let Some(started) = started {
            let _ = started.send(());
        }
        let release = self.release.lock().ok().and_then(|mut release| release.take());
        match release {
            Some(release) => release
                .await
                .unwrap_or_else(|_| Err(OperationError::network("gate dropped"))),
            None => Err(OperationError::network("gated endpoint already used")),
        }
    }
}

/// The payload used throughout the tests for "Explain derivatives".
pub(crate) fn flashcard_result() -> OrchestrationResult {
    OrchestrationResult {
        chosen_tool: Some(json!("flashcard_generator")),
        parameters: Some(json!({"topic": "derivatives"})),
        analysis: Some(json!({})),
        result: Some(json!({"cards": []})),
    }
}

/// Raw HTTP request captured by [`serve_once`].
#[derive(Debug, Clone)]
pub(crate) struct CapturedRequest {
    raw: String,
}

impl CapturedRequest {
    pub(crate) fn body_json(&self) -> serde_json::Value {
        let body = self
            .raw
            .split_once("\r\n\r\n")
            .map(|(_, body)| body)
            .unwrap_or_default();
        serde_json::from_str(body).unwrap_or(serde_json::Value::Null)
    }
}

impl Deref for CapturedRequest {
    type Target = str;

    fn deref(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for CapturedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

pub(crate) struct OneShotServer {
    pub(crate) base_url: String,
    captured: oneshot::Receiver<CapturedRequest>,
}

impl OneShotServer {
    pub(crate) async fn request(self) -> CapturedRequest {
        self.captured.await.unwrap_or(CapturedRequest { raw: String::new() })
    }
}

/// Accepts a single HTTP/1.1 connection on loopback and answers it with `status` and `body`.
pub(crate) async fn serve_once(status: &str, body: &str) -> OneShotServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );
    let (tx, rx) = oneshot::channel();

    tokio::spawn(async move {
        let Ok((mut stream, _)) = listener.accept().await else {
            return;
        };
        let raw = read_http_request(&mut stream).await;
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
        let _ = tx.send(CapturedRequest { raw });
    });

    OneShotServer {
        base_url: format!("http://{addr}"),
        captured: rx,
    }
}

/// A loopback URL nothing listens on.
pub(crate) async fn closed_local_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{addr}")
}

async fn read_http_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let Ok(n) = stream.read(&mut chunk).await else {
            break;
        };
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(header_end) = find_header_end(&buf) {
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let content_length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|window| window == b"\r\n\r\n")
}
