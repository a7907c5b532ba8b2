use std::fs::OpenOptions;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

const DEFAULT_FILTER: &str = "info";

/// Routes `tracing` output to an append-only log file; stdout belongs to the TUI.
///
/// `RUST_LOG` overrides the default `info` filter.
pub fn init(log_file: Option<&Path>) -> anyhow::Result<PathBuf> {
    let path = match log_file {
        Some(path) => path.to_path_buf(),
        None => default_log_path()?,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open log file {}", path.display()))?;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init()
        .context("install tracing subscriber")?;

    tracing::debug!(log_file = %path.display(), "tracing initialized");
    Ok(path)
}

fn default_log_path() -> anyhow::Result<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        anyhow::bail!("cannot determine home directory for log path");
    };
    Ok(log_path_in(&home))
}

fn log_path_in(home: &Path) -> PathBuf {
    home.join(".tutor-orchestrator").join("log").join("tutor.log")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_log_path_lives_under_tutor_home_dir() {
        let home = Path::new("home");
        assert_eq!(
            log_path_in(home),
            home.join(".tutor-orchestrator").join("log").join("tutor.log")
        );
    }
}
