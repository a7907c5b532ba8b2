use crate::session::Session;

/// Summary information produced when the tutor TUI exits.
#[derive(Debug, Clone)]
pub struct AppExitInfo {
    /// Session identifiers at exit. Sentinels once any submission succeeded.
    pub session: Session,
    /// Why the session ended.
    pub exit_reason: ExitReason,
}

/// Reason why the tutor TUI terminated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitReason {
    /// The user requested exit.
    UserRequested,
    /// The terminal went away or could not be drawn to.
    Fatal(String),
}
