use anyhow::Result;
use clap::{Parser, Subcommand};
use ratefeed::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration file
    Setup,
    /// Export rates now and then on every interval (default)
    Watch,
    /// Export rates once and exit
    Once,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let config_path = cli.config_path.as_deref();
    let result = match cli.command {
        Some(Commands::Setup) => match config_path {
            Some(path) => ratefeed::cli::setup::setup_at_path(path),
            None => ratefeed::cli::setup::setup(),
        },
        Some(Commands::Once) => ratefeed::run_command(ratefeed::AppCommand::Once, config_path).await,
        Some(Commands::Watch) | None => {
            ratefeed::run_command(ratefeed::AppCommand::Watch, config_path).await
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
