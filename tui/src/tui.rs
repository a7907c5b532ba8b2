//! Terminal setup, teardown, and the input event stream.

use std::io;
use std::io::Stdout;
use std::io::stdout;
use std::panic;

use crossterm::event::DisableBracketedPaste;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::Event;
use crossterm::event::EventStream;
use crossterm::event::KeyEvent;
use crossterm::execute;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use ratatui::Frame;
use ratatui::backend::CrosstermBackend;
use tokio_stream::Stream;
use tokio_stream::StreamExt;
use tracing::warn;

pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Enters raw mode on the alternate screen with bracketed paste enabled.
///
/// Installs a panic hook that restores the terminal before the default hook prints.
pub fn init() -> io::Result<Terminal> {
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableBracketedPaste)?;
    set_panic_hook();
    ratatui::Terminal::new(CrosstermBackend::new(stdout()))
}

fn set_panic_hook() {
    let hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = restore();
        hook(panic_info);
    }));
}

pub fn restore() -> io::Result<()> {
    execute!(stdout(), DisableBracketedPaste, LeaveAlternateScreen)?;
    disable_raw_mode()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TuiEvent {
    Key(KeyEvent),
    Paste(String),
    /// The screen must be redrawn (resize, focus change).
    Draw,
}

/// Terminal input mapped to [`TuiEvent`]s. Mouse and unknown events are dropped.
pub(crate) fn event_stream() -> impl Stream<Item = TuiEvent> {
    EventStream::new().filter_map(|event| match event {
        Ok(Event::Key(key_event)) => Some(TuiEvent::Key(key_event)),
        Ok(Event::Paste(pasted)) => Some(TuiEvent::Paste(pasted)),
        Ok(Event::Resize(..) | Event::FocusGained) => Some(TuiEvent::Draw),
        Ok(_) => None,
        Err(err) => {
            warn!("failed to read terminal event: {err}");
            None
        }
    })
}

pub struct Tui {
    terminal: Terminal,
}

impl Tui {
    pub fn new(terminal: Terminal) -> Self {
        Self { terminal }
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> io::Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }
}
