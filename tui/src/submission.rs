//! Request lifecycle of the orchestrator form.
//!
//! `Idle -> Submitting -> {Succeeded, Failed}`; the next submit re-enters `Submitting` and Clear
//! returns to `Idle`. Each submission is tagged with a generation number. Clear bumps the
//! generation and aborts the request task, so a completion that arrives afterwards is discarded
//! instead of resurrecting the cleared outcome.

use std::sync::Arc;

use tokio::task::AbortHandle;
use tracing::debug;
use tracing::error;
use tracing::info;
use tutor_protocol::protocol::ChatRequest;
use tutor_protocol::protocol::OperationError;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::endpoint::EndpointConfig;
use crate::endpoint::HttpOrchestratorClient;
use crate::endpoint::OrchestratorEndpoint;
use crate::endpoint::SubmissionOutcome;
use crate::session::Session;
use crate::view_state::ViewState;

/// A submission that has entered `Submitting` and still needs its network call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSubmission {
    pub generation: u64,
    pub request: ChatRequest,
}

/// Owns the [`Session`] and [`ViewState`] and drives them through the request lifecycle.
pub struct SubmissionController<E> {
    endpoint: Arc<E>,
    session: Session,
    state: ViewState,
    generation: u64,
    in_flight: Option<AbortHandle>,
}

impl SubmissionController<HttpOrchestratorClient> {
    /// Controller talking HTTP to the backend described by `config`.
    pub fn from_config(config: EndpointConfig, session: Session) -> anyhow::Result<Self> {
        Ok(Self::new(HttpOrchestratorClient::new(config)?, session))
    }
}

impl<E: OrchestratorEndpoint> SubmissionController<E> {
    pub fn new(endpoint: E, session: Session) -> Self {
        Self {
            endpoint: Arc::new(endpoint),
            session,
            state: ViewState::default(),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Mutable access for editing the draft. Lifecycle fields stay controller-owned.
    pub fn state_mut(&mut self) -> &mut ViewState {
        &mut self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Enters `Submitting` and builds the request envelope.
    ///
    /// Returns `None` (and changes nothing) when the draft is blank or a request is in flight.
    pub fn begin_submit(&mut self) -> Option<PendingSubmission> {
        if !self.state.is_submittable() {
            debug!(
                loading = self.state.loading(),
                "submit ignored: draft is blank or a request is in flight"
            );
            return None;
        }

        self.generation += 1;
        self.state.begin_submission();
        let request = self.session.envelope(self.state.draft().text());
        debug!(generation = self.generation, "submission started");
        Some(PendingSubmission {
            generation: self.generation,
            request,
        })
    }

    /// Applies the outcome of submission `generation`.
    ///
    /// Returns `false` when the outcome is stale (cleared or superseded) and was discarded.
    pub fn finish_submit(&mut self, generation: u64, outcome: SubmissionOutcome) -> bool {
        if generation != self.generation || !self.state.loading() {
            debug!(
                generation,
                current = self.generation,
                "discarding stale submission outcome"
            );
            return false;
        }

        self.in_flight = None;
        match outcome {
            Ok(result) => {
                if self.session.bootstrap() {
                    info!(
                        user_id = ?self.session.user_id(),
                        chat_id = ?self.session.chat_id(),
                        "session identifiers assigned"
                    );
                }
                debug!(generation, tool = ?result.chosen_tool, "submission succeeded");
                self.state.record_success(result);
            }
            Err(err) => {
                debug!(generation, "submission failed: {}", err.summary());
                self.state.record_failure(err);
            }
        }
        true
    }

    /// Runs one submission to completion on the current task.
    pub async fn submit(&mut self) {
        let Some(PendingSubmission {
            generation,
            request,
        }) = self.begin_submit()
        else {
            return;
        };
        let outcome = self.endpoint.orchestrate(request).await;
        self.finish_submit(generation, outcome);
    }

    /// Starts a submission in the background; its outcome arrives as
    /// [`AppEvent::SubmissionFinished`] on `app_event_tx`.
    ///
    /// Returns `false` if the submit was a no-op.
    pub fn spawn_submit(&mut self, app_event_tx: AppEventSender) -> bool {
        let Some(PendingSubmission {
            generation,
            request,
        }) = self.begin_submit()
        else {
            return false;
        };

        let endpoint = Arc::clone(&self.endpoint);
        let request_task = tokio::spawn(async move { endpoint.orchestrate(request).await });
        self.in_flight = Some(request_task.abort_handle());

        // A panicking request task still has to bring `loading` back down.
        tokio::spawn(async move {
            let outcome = match request_task.await {
                Ok(outcome) => outcome,
                Err(err) if err.is_cancelled() => return,
                Err(err) => {
                    error!("orchestration request task failed: {err}");
                    Err(OperationError::network(err.to_string()))
                }
            };
            app_event_tx.send(AppEvent::SubmissionFinished {
                generation,
                outcome,
            });
        });
        true
    }

    /// Clears the last result and error, aborting any in-flight request. The draft is kept.
    pub fn clear(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            debug!(generation = self.generation, "aborting in-flight submission");
            in_flight.abort();
        }
        self.generation += 1;
        self.state.clear_outcome();
    }
}

impl<E> Drop for SubmissionController<E> {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.abort();
        }
    }
}
