//! Application-level events used to coordinate UI actions.

use crate::endpoint::SubmissionOutcome;

#[allow(clippy::large_enum_variant)]
#[derive(Debug)]
pub enum AppEvent {
    /// A background orchestration request finished. `generation` echoes the submission that
    /// started it so the UI can drop results the user already cleared.
    SubmissionFinished {
        generation: u64,
        outcome: SubmissionOutcome,
    },
}
