//! Event loop of the tutor TUI.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use ratatui::Frame;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::unbounded_channel;
use tokio_stream::StreamExt;
use tracing::debug;
use tracing::info;

use crate::app_event::AppEvent;
use crate::app_event_sender::AppEventSender;
use crate::endpoint::OrchestratorEndpoint;
use crate::exit::AppExitInfo;
use crate::exit::ExitReason;
use crate::presenter::present;
use crate::screen::TutorScreen;
use crate::submission::SubmissionController;
use crate::tui;
use crate::tui::Tui;
use crate::tui::TuiEvent;

const RESPONSE_PAGE: u16 = 10;

/// Runs the orchestrator form on the alternate screen until the user quits.
pub async fn run_tutor_app<E: OrchestratorEndpoint>(
    controller: SubmissionController<E>,
    docs_url: String,
) -> anyhow::Result<AppExitInfo> {
    let terminal = tui::init()?;
    let mut tui = Tui::new(terminal);

    let result = TutorApp::new(controller, docs_url).run(&mut tui).await;

    // Always attempt to restore the terminal, even if the loop fails.
    let _ = tui::restore();
    result
}

pub struct TutorApp<E> {
    controller: SubmissionController<E>,
    docs_url: String,
    response_scroll: u16,
    app_event_tx: AppEventSender,
    app_event_rx: Option<UnboundedReceiver<AppEvent>>,
    exit_reason: Option<ExitReason>,
}

impl<E: OrchestratorEndpoint> TutorApp<E> {
    pub fn new(controller: SubmissionController<E>, docs_url: impl Into<String>) -> Self {
        let (app_event_tx, app_event_rx) = unbounded_channel();
        Self {
            controller,
            docs_url: docs_url.into(),
            response_scroll: 0,
            app_event_tx: AppEventSender::new(app_event_tx),
            app_event_rx: Some(app_event_rx),
            exit_reason: None,
        }
    }

    pub fn controller(&self) -> &SubmissionController<E> {
        &self.controller
    }

    pub async fn run(mut self, tui: &mut Tui) -> anyhow::Result<AppExitInfo> {
        let Some(mut app_event_rx) = self.app_event_rx.take() else {
            anyhow::bail!("tutor app event loop already ran");
        };

        let events = tui::event_stream();
        tokio::pin!(events);

        tui.draw(|frame| self.render_frame(frame))?;
        let exit_reason = loop {
            if let Some(exit_reason) = self.exit_reason.take() {
                break exit_reason;
            }
            tokio::select! {
                event = events.next() => match event {
                    Some(event) => self.handle_tui_event(event),
                    None => {
                        self.exit_reason =
                            Some(ExitReason::Fatal("terminal input stream closed".to_string()));
                    }
                },
                Some(app_event) = app_event_rx.recv() => self.handle_app_event(app_event),
            }
            tui.draw(|frame| self.render_frame(frame))?;
        };

        info!(?exit_reason, "tutor session finished");
        Ok(AppExitInfo {
            session: *self.controller.session(),
            exit_reason,
        })
    }

    fn render_frame(&self, frame: &mut Frame) {
        let area = frame.area();
        let screen = self.screen();
        frame.render_widget_ref(&screen, area);
        if let Some((x, y)) = screen.cursor_pos(area) {
            frame.set_cursor_position((x, y));
        }
    }

    fn screen(&self) -> TutorScreen<'_> {
        TutorScreen::new(
            self.controller.state(),
            &self.docs_url,
            self.response_scroll,
        )
    }

    fn handle_tui_event(&mut self, event: TuiEvent) {
        match event {
            TuiEvent::Key(key_event) => self.handle_key_event(key_event),
            TuiEvent::Paste(pasted) => self.controller.state_mut().draft_mut().insert_str(&pasted),
            TuiEvent::Draw => {}
        }
    }

    pub(crate) fn handle_key_event(&mut self, key_event: KeyEvent) {
        if key_event.kind == KeyEventKind::Release {
            return;
        }
        let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
        let newline_modifier = key_event
            .modifiers
            .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT);

        match key_event.code {
            KeyCode::Char('c' | 'd') if ctrl => {
                self.exit_reason = Some(ExitReason::UserRequested);
            }
            KeyCode::Char('l') if ctrl => {
                self.controller.clear();
                self.response_scroll = 0;
            }
            KeyCode::Char('u') if ctrl => self.draft_mut().clear(),
            KeyCode::Char('j') if ctrl => self.draft_mut().insert_newline(),
            KeyCode::Enter if newline_modifier => self.draft_mut().insert_newline(),
            KeyCode::Enter => self.submit(),
            KeyCode::Char(ch) if !ctrl => self.draft_mut().insert_char(ch),
            KeyCode::Backspace => self.draft_mut().backspace(),
            KeyCode::Delete => self.draft_mut().delete(),
            KeyCode::Left => self.draft_mut().move_left(),
            KeyCode::Right => self.draft_mut().move_right(),
            KeyCode::Home => self.draft_mut().move_home(),
            KeyCode::End => self.draft_mut().move_end(),
            KeyCode::PageUp => {
                self.response_scroll = self.response_scroll.saturating_sub(RESPONSE_PAGE);
            }
            KeyCode::PageDown => {
                let max_scroll = self.response_line_count().saturating_sub(1);
                self.response_scroll = self
                    .response_scroll
                    .saturating_add(RESPONSE_PAGE)
                    .min(max_scroll);
            }
            _ => {}
        }
    }

    pub(crate) fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::SubmissionFinished {
                generation,
                outcome,
            } => {
                if self.controller.finish_submit(generation, outcome) {
                    self.response_scroll = 0;
                }
            }
        }
    }

    fn submit(&mut self) {
        if self.controller.spawn_submit(self.app_event_tx.clone()) {
            debug!(generation = self.controller.generation(), "submit dispatched");
            self.response_scroll = 0;
        }
    }

    fn draft_mut(&mut self) -> &mut crate::draft::Draft {
        self.controller.state_mut().draft_mut()
    }

    fn response_line_count(&self) -> u16 {
        let lines = present(self.controller.state()).display_lines().len();
        u16::try_from(lines).unwrap_or(u16::MAX)
    }
}
