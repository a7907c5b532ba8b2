mod config;
mod logging;
mod startup;

use std::path::PathBuf;

use anyhow::Context;
use clap::CommandFactory;
use clap::FromArgMatches;
use clap::Parser;
use clap::Subcommand;
use tracing::info;
use tracing::warn;
use tutor_protocol::ChatId;
use tutor_protocol::UserId;
use tutor_tui::EndpointConfig;
use tutor_tui::ExitReason;
use tutor_tui::HttpOrchestratorClient;
use tutor_tui::Session;
use tutor_tui::SubmissionController;

use crate::config::ConfigStore;
use crate::startup::BaseUrlOrigin;
use crate::startup::StartupError;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Send student requests to the Autonomous AI Tutor Orchestrator"
)]
struct Cli {
    /// Base URL of the orchestrator backend.
    #[arg(long, env = "TUTOR_API_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Student identifier to send from the first request on.
    #[arg(long, global = true)]
    user_id: Option<UserId>,

    /// Conversation identifier to send from the first request on.
    #[arg(long, global = true)]
    chat_id: Option<ChatId>,

    /// Config file to read instead of `~/.tutor-orchestrator/config.toml`.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log file to append to instead of `~/.tutor-orchestrator/log/tutor.log`.
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Send a single message and print the orchestrator's response.
    Ask {
        /// The student request, e.g. "Make concise notes about derivatives".
        message: String,
    },
    /// Check that the orchestrator backend is reachable.
    Health,
}

fn parse_cli() -> Cli {
    let matches = Cli::command()
        .version(tutor_tui::TUTOR_VERSION)
        .get_matches();
    Cli::from_arg_matches(&matches).unwrap_or_else(|err| err.exit())
}

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = parse_cli();

    if let Err(err) = logging::init(cli.log_file.as_deref()) {
        eprintln!("warning: failed to set up logging: {err:#}");
    }

    let config_store = match &cli.config {
        Some(path) => ConfigStore::new(path.clone()),
        None => ConfigStore::new_default()?,
    };
    let file_config = match config_store.load() {
        Ok(file_config) => file_config,
        Err(err) => exit_with_startup_error(&StartupError::InvalidConfig {
            path: config_store.path().to_path_buf(),
            reason: format!("{err:#}"),
        }),
    };

    let origin = if cli.base_url.is_some() {
        BaseUrlOrigin::CommandLine
    } else if file_config.base_url.is_some() {
        BaseUrlOrigin::ConfigFile(config_store.path().to_path_buf())
    } else {
        BaseUrlOrigin::Default
    };
    let base_url = config::resolve_base_url(cli.base_url.as_deref(), &file_config);
    let endpoint = match startup::resolve_endpoint(&base_url, origin) {
        Ok(endpoint) => endpoint,
        Err(err) => exit_with_startup_error(&err),
    };
    let session = config::resolve_session(cli.user_id, cli.chat_id, &file_config);
    info!(
        base_url = %endpoint.base_url(),
        user_id = ?session.user_id(),
        chat_id = ?session.chat_id(),
        "starting tutor client"
    );

    match cli.command {
        Some(CliCommand::Ask { message }) => run_ask(endpoint, session, message).await,
        Some(CliCommand::Health) => run_health(endpoint).await,
        None => run_interactive(endpoint, session).await,
    }
}

fn exit_with_startup_error(err: &StartupError) -> ! {
    eprint!("{}", err.render_ansi());
    std::process::exit(1);
}

async fn run_interactive(endpoint: EndpointConfig, session: Session) -> anyhow::Result<()> {
    let docs_url = endpoint.docs_url().to_string();
    let controller = SubmissionController::from_config(endpoint, session)
        .context("create orchestrator client")?;
    let exit_info = tutor_tui::run_tutor_app(controller, docs_url).await?;

    match exit_info.exit_reason {
        ExitReason::UserRequested => Ok(()),
        ExitReason::Fatal(message) => {
            eprintln!("{message}");
            std::process::exit(1);
        }
    }
}

/// Prints the same views the TUI shows. Exits with status 1 when the backend reported an error.
async fn run_ask(endpoint: EndpointConfig, session: Session, message: String) -> anyhow::Result<()> {
    let mut controller = SubmissionController::from_config(endpoint, session)
        .context("create orchestrator client")?;
    controller.state_mut().draft_mut().set_message(message);
    if !controller.state().is_submittable() {
        anyhow::bail!("message must not be empty");
    }

    controller.submit().await;

    let state = controller.state();
    print!("{}", tutor_tui::present(state).to_plain_text());
    if let Some(err) = state.last_error() {
        warn!("one-shot request failed: {}", err.summary());
        std::process::exit(1);
    }
    Ok(())
}

async fn run_health(endpoint: EndpointConfig) -> anyhow::Result<()> {
    let health_url = endpoint.health_url().to_string();
    let client = HttpOrchestratorClient::new(endpoint).context("create orchestrator client")?;
    let health = client
        .health()
        .await
        .with_context(|| format!("check {health_url}"))?;

    if health.is_ok() {
        println!("{health_url}: ok");
        return Ok(());
    }
    eprintln!("{health_url}: unexpected status `{}`", health.status);
    std::process::exit(1);
}
