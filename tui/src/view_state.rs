use tutor_protocol::protocol::OperationError;
use tutor_protocol::protocol::OrchestrationResult;

use crate::draft::Draft;

/// Where the submission lifecycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionPhase {
    /// Nothing submitted yet, or the outcome was cleared.
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

/// Everything the screen renders from.
///
/// Only the submission controller mutates the lifecycle fields; the presenter reads them.
#[derive(Debug, Clone)]
pub struct ViewState {
    draft: Draft,
    loading: bool,
    phase: SubmissionPhase,
    last_result: Option<OrchestrationResult>,
    last_error: Option<OperationError>,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            draft: Draft::new(),
            loading: false,
            phase: SubmissionPhase::Idle,
            last_result: None,
            last_error: None,
        }
    }
}

impl ViewState {
    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn last_result(&self) -> Option<&OrchestrationResult> {
        self.last_result.as_ref()
    }

    pub fn last_error(&self) -> Option<&OperationError> {
        self.last_error.as_ref()
    }

    /// Submit is enabled only for a non-blank draft while no request is in flight.
    pub fn is_submittable(&self) -> bool {
        !self.draft.is_blank() && !self.loading
    }

    /// Enters `Submitting`. The previous error is dropped; the previous result stays until the new
    /// outcome is known.
    pub(crate) fn begin_submission(&mut self) {
        self.loading = true;
        self.phase = SubmissionPhase::Submitting;
        self.last_error = None;
    }

    pub(crate) fn record_success(&mut self, result: OrchestrationResult) {
        self.loading = false;
        self.phase = SubmissionPhase::Succeeded;
        self.last_result = Some(result);
        self.last_error = None;
    }

    /// Records a failure. The previous result is left in place.
    pub(crate) fn record_failure(&mut self, error: OperationError) {
        self.loading = false;
        self.phase = SubmissionPhase::Failed;
        self.last_error = Some(error);
    }

    /// Drops the outcome of every submission so far. The draft is untouched.
    pub(crate) fn clear_outcome(&mut self) {
        self.loading = false;
        self.phase = SubmissionPhase::Idle;
        self.last_result = None;
        self.last_error = None;
    }
}
