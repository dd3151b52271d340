use anyhow::Result;
use clap::Parser;
use toastlet::cli::{Cli, CliHandler, Commands};
use toastlet::notifications::Presenter;
use toastlet::surface::MemorySurface;
use toastlet::PresenterConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set log level based on debug flag
    let log_level = if cli.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(log_level).init();

    let config_path = cli.config.unwrap_or_else(PresenterConfig::default_path);
    let config = PresenterConfig::load(&config_path).await?;

    let presenter = Presenter::new(MemorySurface::new(), config)?;
    let handler = CliHandler::new(presenter);

    handler
        .handle_command(cli.command.unwrap_or(Commands::Demo))
        .await
}
