mod platform;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use notes_logging::notes_warn;

use platform::config::{self, AppConfig, DEFAULT_CONFIG_FILE};
use platform::{ExportAction, ExportRequest};

/// Export notes and Q&A transcripts from a saved ChatGPT conversation.
#[derive(Debug, Parser)]
#[command(name = "chat-notes", version)]
struct Cli {
    /// Config file; missing means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Save every assistant response as a styled HTML page.
    CollectNotes(ExportArgs),
    /// Save the conversation as `question | answer` lines.
    GenerateQa(ExportArgs),
}

#[derive(Debug, Args)]
struct ExportArgs {
    /// Saved conversation page (HTML).
    page: PathBuf,
    /// URL of the tab the page was saved from.
    #[arg(long, default_value = "https://chatgpt.com/")]
    tab_url: String,
    /// Print the saved file's path once the download completes.
    #[arg(long)]
    reveal: bool,
}

impl Command {
    fn into_request(self) -> ExportRequest {
        let (action, args) = match self {
            Command::CollectNotes(args) => (ExportAction::CollectNotes, args),
            Command::GenerateQa(args) => (ExportAction::GenerateQa, args),
        };
        ExportRequest {
            action,
            page: args.page,
            tab_url: args.tab_url,
            reveal: args.reveal,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (app_config, config_error) = match config::load(&cli.config) {
        Ok(loaded) => (loaded, None),
        Err(err) => (AppConfig::default(), Some(err)),
    };
    platform::logging::initialize(app_config.log_destination, app_config.log_level);
    if let Some(err) = config_error {
        notes_warn!("Using default configuration: {err}");
    }

    platform::run(cli.command.into_request(), app_config).await
}
