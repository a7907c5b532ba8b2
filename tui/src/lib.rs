// Forbid accidental stdout/stderr writes in the library portion of the TUI.
#![deny(clippy::print_stdout, clippy::print_stderr)]

mod exit;

mod app;
mod app_event;
mod app_event_sender;
mod draft;
mod endpoint;
mod key_hint;
mod presenter;
mod render;
mod screen;
mod session;
mod submission;
mod tui;
mod version;
mod view_state;

#[cfg(test)]
mod test_support;

pub use app::TutorApp;
pub use app::run_tutor_app;
pub use app_event::AppEvent;
pub use app_event_sender::AppEventSender;
pub use draft::Draft;
pub use endpoint::EndpointConfig;
pub use endpoint::EndpointConfigError;
pub use endpoint::HttpOrchestratorClient;
pub use endpoint::OrchestratorEndpoint;
pub use endpoint::SubmissionOutcome;
pub use exit::AppExitInfo;
pub use exit::ExitReason;
pub use presenter::ErrorView;
pub use presenter::Presentation;
pub use presenter::ResultView;
pub use presenter::present;
pub use session::Session;
pub use submission::PendingSubmission;
pub use submission::SubmissionController;
pub use tui::Tui;
pub use version::TUTOR_VERSION;
pub use view_state::SubmissionPhase;
pub use view_state::ViewState;
