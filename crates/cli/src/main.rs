//! Deskmate CLI: the main entry point.
//!
//! Commands:
//! - `chat`    Interactive assistant (default when no command is given)
//! - `ask`     Single-message mode
//! - `status`  Show resolved configuration
//! - `doctor`  Diagnose configuration and connectivity

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "deskmate",
    about = "Deskmate: a keyword-routed chat assistant for your terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file (JSON, or TOML with a `.toml` extension)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant
    Chat,

    /// Send a single message and print the response
    Ask {
        /// The message to send
        #[arg(short, long)]
        message: String,
    },

    /// Show resolved configuration
    Status,

    /// Diagnose configuration and connectivity
    Doctor,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Warnings only by default so log lines don't interleave with the chat.
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = cli.config.as_deref();
    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::chat::run(config).await?,
        Commands::Ask { message } => commands::ask::run(config, &message).await?,
        Commands::Status => commands::status::run(config).await?,
        Commands::Doctor => commands::doctor::run(config).await?,
    }

    Ok(())
}
