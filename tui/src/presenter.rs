//! Read-only projection of the last outcome.
//!
//! [`present`] is pure: it never touches the controller and never assumes a shape for the opaque
//! JSON payloads. Missing fields render as `undefined`.

use ratatui::style::Stylize;
use ratatui::text::Line;
use ratatui::text::Span;
use serde_json::Value;
use tutor_protocol::protocol::OperationError;
use tutor_protocol::protocol::OrchestrationResult;
use tutor_protocol::tools::KnownTool;

use crate::view_state::ViewState;

const UNDEFINED: &str = "undefined";

const CHOSEN_TOOL_HEADING: &str = "Chosen Tool";
const PARAMETERS_HEADING: &str = "Extracted Parameters";
const ANALYSIS_HEADING: &str = "Analysis";
const RESULT_HEADING: &str = "API Result";
const ERROR_HEADING: &str = "Error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Presentation {
    /// Nothing submitted yet (or cleared).
    Empty,
    Result(ResultView),
    Error(ErrorView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultView {
    pub chosen_tool: String,
    pub tool_title: Option<&'static str>,
    pub parameters: String,
    pub analysis: String,
    pub result: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorView {
    pub summary: String,
    pub body: String,
}

/// An error, when present, takes precedence over a result kept from an earlier submission.
pub fn present(state: &ViewState) -> Presentation {
    if let Some(error) = state.last_error() {
        return Presentation::Error(error_view(error));
    }
    match state.last_result() {
        Some(result) => Presentation::Result(result_view(result)),
        None => Presentation::Empty,
    }
}

fn result_view(result: &OrchestrationResult) -> ResultView {
    let chosen_tool = match result.chosen_tool.as_ref() {
        None => UNDEFINED.to_string(),
        Some(Value::String(token)) => token.clone(),
        Some(other) => other.to_string(),
    };
    ResultView {
        tool_title: result
            .chosen_tool_token()
            .and_then(KnownTool::from_token)
            .map(KnownTool::title),
        chosen_tool,
        parameters: pretty_json(result.parameters.as_ref()),
        analysis: pretty_json(result.analysis.as_ref()),
        result: pretty_json(result.result.as_ref()),
    }
}

fn error_view(error: &OperationError) -> ErrorView {
    ErrorView {
        summary: error.summary(),
        body: error.to_pretty_json(),
    }
}

fn pretty_json(value: Option<&Value>) -> String {
    match value {
        None => UNDEFINED.to_string(),
        Some(value) => serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string()),
    }
}

impl ResultView {
    fn tool_label(&self) -> String {
        match self.tool_title {
            Some(title) => format!("{} ({title})", self.chosen_tool),
            None => self.chosen_tool.clone(),
        }
    }

    fn json_sections(&self) -> [(&'static str, &str); 3] {
        [
            (PARAMETERS_HEADING, self.parameters.as_str()),
            (ANALYSIS_HEADING, self.analysis.as_str()),
            (RESULT_HEADING, self.result.as_str()),
        ]
    }
}

impl Presentation {
    /// Plain text used by the one-shot CLI.
    pub fn to_plain_text(&self) -> String {
        match self {
            Presentation::Empty => String::new(),
            Presentation::Result(view) => {
                let mut out = format!("{CHOSEN_TOOL_HEADING}\nTool: {}\n", view.tool_label());
                for (heading, body) in view.json_sections() {
                    out.push_str(&format!("\n{heading}\n{body}\n"));
                }
                out
            }
            Presentation::Error(view) => {
                format!("{ERROR_HEADING}: {}\n{}\n", view.summary, view.body)
            }
        }
    }

    /// Styled lines for the response pane.
    pub fn display_lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line<'static>> = Vec::new();
        match self {
            Presentation::Empty => {
                lines.push(Line::from("Responses from the orchestrator appear here.").dim());
            }
            Presentation::Result(view) => {
                lines.push(Line::from(CHOSEN_TOOL_HEADING).bold());
                let mut tool = vec![
                    Span::from("Tool: ").dim(),
                    Span::from(view.chosen_tool.clone()).cyan(),
                ];
                if let Some(title) = view.tool_title {
                    tool.push(Span::from(format!(" ({title})")).dim());
                }
                lines.push(Line::from(tool));
                for (heading, body) in view.json_sections() {
                    lines.push(Line::from(""));
                    lines.push(Line::from(heading).bold());
                    lines.extend(body.lines().map(|line| Line::from(line.to_string())));
                }
            }
            Presentation::Error(view) => {
                lines.push(Line::from(vec![
                    Span::from(format!("{ERROR_HEADING}: ")).red().bold(),
                    Span::from(view.summary.clone()).red(),
                ]));
                lines.extend(
                    view.body
                        .lines()
                        .map(|line| Line::from(line.to_string()).dim()),
                );
            }
        }
        lines
    }
}
