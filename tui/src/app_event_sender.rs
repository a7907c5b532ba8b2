use tokio::sync::mpsc::UnboundedSender;

use crate::app_event::AppEvent;

/// Cloneable handle background tasks use to post [`AppEvent`]s to the UI loop.
#[derive(Clone, Debug)]
pub struct AppEventSender {
    app_event_tx: UnboundedSender<AppEvent>,
}

impl AppEventSender {
    pub fn new(app_event_tx: UnboundedSender<AppEvent>) -> Self {
        Self { app_event_tx }
    }

    /// Send an event to the app event channel. If it fails, we swallow the error and log it.
    pub fn send(&self, event: AppEvent) {
        if let Err(e) = self.app_event_tx.send(event) {
            tracing::error!("failed to send event: {e}");
        }
    }
}
