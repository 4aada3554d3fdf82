//! Relay CLI entry point.

use anyhow::Result;
use clap::Parser;

use relay::cli::{commands, Cli, Commands};
use relay::infrastructure::logging::{LogConfig, LoggerImpl};
use relay::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli.command, cli.config.as_deref(), cli.json).await {
        relay::cli::handle_error(&err, cli.json);
    }
}

async fn run(command: Commands, config_path: Option<&std::path::Path>, json: bool) -> Result<()> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&LogConfig::from(&config.logging))?;

    match command {
        Commands::Plan(args) => commands::plan::execute(args, &config, json).await,
        Commands::Check(args) => commands::check::execute(args, json).await,
        Commands::Merge(args) => commands::merge::execute(args, &config, json).await,
        Commands::Render(args) => commands::render::execute(args, json).await,
    }
}
