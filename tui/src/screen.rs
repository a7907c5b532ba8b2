//! The single orchestrator form: header, composer, status line, response pane, and footer.

use crossterm::event::KeyCode;
use ratatui::buffer::Buffer;
use ratatui::layout::Constraint;
use ratatui::layout::Layout;
use ratatui::layout::Rect;
use ratatui::prelude::Widget as _;
use ratatui::style::Style;
use ratatui::style::Stylize as _;
use ratatui::text::Line;
use ratatui::text::Span;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::WidgetRef;

use crate::key_hint;
use crate::presenter::Presentation;
use crate::presenter::present;
use crate::render::Insets;
use crate::render::RectExt as _;
use crate::render::renderable::ColumnRenderable;
use crate::render::renderable::Renderable;
use crate::render::renderable::RenderableExt as _;
use crate::view_state::ViewState;

const TITLE: &str = "Autonomous AI Tutor Orchestrator";
const SUBTITLE: &str = "Describe what you need; the orchestrator picks a tool and runs it.";
const COMPOSER_TITLE: &str = " Student message ";
const COMPOSER_PLACEHOLDER: &str = "e.g., Make concise notes about derivatives for a beginner";
const RESPONSE_TITLE: &str = " Response ";
const SUBMIT_LABEL: &str = " Send to Orchestrator";
const LOADING_LABEL: &str = "Analyzing...";
const MAX_COMPOSER_ROWS: u16 = 6;

pub(crate) struct TutorScreen<'a> {
    state: &'a ViewState,
    presentation: Presentation,
    docs_url: &'a str,
    response_scroll: u16,
}

impl<'a> TutorScreen<'a> {
    pub(crate) fn new(state: &'a ViewState, docs_url: &'a str, response_scroll: u16) -> Self {
        Self {
            state,
            presentation: present(state),
            docs_url,
            response_scroll,
        }
    }

    fn header(&self) -> ColumnRenderable<'static> {
        let mut header = ColumnRenderable::new();
        header.push("");
        header.push(Line::from(TITLE).bold().inset(Insets::tlbr(0, 2, 0, 0)));
        header.push(Line::from(SUBTITLE).dim().inset(Insets::tlbr(0, 2, 0, 0)));
        header.push("");
        header
    }

    fn composer_height(&self) -> u16 {
        let rows = self.state.draft().text().split('\n').count();
        let rows = u16::try_from(rows).unwrap_or(u16::MAX);
        rows.clamp(1, MAX_COMPOSER_ROWS) + 2
    }

    fn areas(&self, area: Rect) -> [Rect; 5] {
        Layout::vertical([
            Constraint::Length(self.header().desired_height(area.width)),
            Constraint::Length(self.composer_height()),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .areas(area)
    }

    fn composer_block(&self) -> Block<'static> {
        let border_style = if self.state.loading() {
            Style::new().dim()
        } else {
            Style::new().cyan()
        };
        Block::bordered()
            .title(COMPOSER_TITLE)
            .border_style(border_style)
    }

    /// Vertical and horizontal scroll keeping the cursor inside `inner`.
    fn composer_scroll(&self, inner: Rect) -> (u16, u16) {
        let (row, col) = self.cursor_row_col();
        (
            row.saturating_sub(inner.height.saturating_sub(1)),
            col.saturating_sub(inner.width.saturating_sub(1)),
        )
    }

    fn cursor_row_col(&self) -> (u16, u16) {
        let (row, col) = self.state.draft().cursor_row_col();
        (
            u16::try_from(row).unwrap_or(u16::MAX),
            u16::try_from(col).unwrap_or(u16::MAX),
        )
    }

    fn render_composer(&self, area: Rect, buf: &mut Buffer) {
        let block = self.composer_block();
        let inner = block.inner(area);
        block.render(area, buf);

        let text = self.state.draft().text();
        if text.is_empty() {
            Paragraph::new(Line::from(COMPOSER_PLACEHOLDER).dim()).render(inner, buf);
            return;
        }
        Paragraph::new(text)
            .scroll(self.composer_scroll(inner))
            .render(inner, buf);
    }

    fn status_line(&self) -> Line<'static> {
        let mut spans: Vec<Span<'static>> = Vec::new();
        if self.state.loading() {
            spans.push(LOADING_LABEL.cyan());
        } else if self.state.is_submittable() {
            spans.push(key_hint::plain(KeyCode::Enter).into());
            spans.push(SUBMIT_LABEL.into());
        } else {
            spans.push(key_hint::plain(KeyCode::Enter).into());
            spans.push(SUBMIT_LABEL.dim());
            spans.push(" (type a message first)".dim());
        }
        if let Some(error) = self.state.last_error() {
            spans.push("   ".into());
            spans.push(error.summary().red());
        }
        Line::from(spans)
    }

    fn render_response(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::TOP)
            .title(RESPONSE_TITLE)
            .border_style(Style::new().dim());
        Paragraph::new(self.presentation.display_lines())
            .block(block)
            .scroll((self.response_scroll, 0))
            .render(area.inset(Insets::tlbr(0, 2, 0, 2)), buf);
    }

    fn footer(&self) -> Line<'static> {
        Line::from(vec![
            key_hint::shift(KeyCode::Enter).into(),
            " newline  ".dim(),
            key_hint::ctrl(KeyCode::Char('l')).into(),
            " clear  ".dim(),
            key_hint::ctrl(KeyCode::Char('u')).into(),
            " clear draft  ".dim(),
            key_hint::ctrl(KeyCode::Char('c')).into(),
            " quit   ".dim(),
            format!("Backend docs at {}", self.docs_url).dim(),
        ])
    }

    /// Terminal cursor position inside the composer.
    pub(crate) fn cursor_pos(&self, area: Rect) -> Option<(u16, u16)> {
        let [_, composer, ..] = self.areas(area);
        let inner = self.composer_block().inner(composer);
        if inner.is_empty() {
            return None;
        }
        let (row, col) = self.cursor_row_col();
        let (scroll_y, scroll_x) = self.composer_scroll(inner);
        Some((
            inner.x.saturating_add(col - scroll_x),
            inner.y.saturating_add(row - scroll_y),
        ))
    }
}

impl WidgetRef for &TutorScreen<'_> {
    fn render_ref(&self, area: Rect, buf: &mut Buffer) {
        let [header, composer, status, response, footer] = self.areas(area);
        self.header().render(header, buf);
        self.render_composer(composer, buf);
        self.status_line()
            .render(status.inset(Insets::tlbr(0, 2, 0, 2)), buf);
        self.render_response(response, buf);
        self.footer()
            .render(footer.inset(Insets::tlbr(0, 2, 0, 2)), buf);
    }
}

#[cfg(test)]
pub(crate) fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    (area.top()..area.bottom())
        .map(|y| {
            (area.left()..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>()
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
