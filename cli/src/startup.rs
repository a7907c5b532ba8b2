use std::path::PathBuf;

use tutor_tui::EndpointConfig;
use tutor_tui::EndpointConfigError;

/// Where the base URL in effect came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BaseUrlOrigin {
    /// `--base-url` or `TUTOR_API_BASE_URL`.
    CommandLine,
    ConfigFile(PathBuf),
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartupError {
    InvalidBaseUrl {
        source: EndpointConfigError,
        origin: BaseUrlOrigin,
    },
    InvalidConfig {
        path: PathBuf,
        reason: String,
    },
}

impl StartupError {
    pub fn render_ansi(&self) -> String {
        match self {
            StartupError::InvalidBaseUrl { source, origin } => {
                let hint = match origin {
                    BaseUrlOrigin::CommandLine => {
                        "Check the value passed via `--base-url` or `TUTOR_API_BASE_URL`.".to_string()
                    }
                    BaseUrlOrigin::ConfigFile(path) => {
                        format!("Check `base_url` in {}.", path.display())
                    }
                    BaseUrlOrigin::Default => "Pass `--base-url` to choose a backend.".to_string(),
                };
                ansi_red(format!(
                    "Failed to configure the orchestrator backend: {source}.\n{hint}\n"
                ))
            }
            StartupError::InvalidConfig { path, reason } => ansi_red(format!(
                "Failed to read tutor config {}: {reason}.\n",
                path.display()
            )),
        }
    }
}

pub fn resolve_endpoint(
    base_url: &str,
    origin: BaseUrlOrigin,
) -> Result<EndpointConfig, StartupError> {
    EndpointConfig::parse(base_url)
        .map_err(|source| StartupError::InvalidBaseUrl { source, origin })
}

fn ansi_red(text: String) -> String {
    format!("\u{1b}[31m{text}\u{1b}[0m")
}
