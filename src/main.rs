#![deny(clippy::all, clippy::pedantic)]

use std::process;

use clap::Parser;
use smartlead_cli::{
    args::Cli,
    client::Ctx,
    config::{self, ConfigStore},
    error::CliError,
    handlers, print, telemetry,
};
use tracing::debug;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        print::error(&error);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let logging = config::build_logging_settings(&cli.logging)?;
    telemetry::init(&logging)?;

    let path = config::config_file_path(&cli.settings)?;
    let settings = config::load(&path, &cli.settings)?;
    debug!(
        config_file = %path.display(),
        base_url = %settings.base_url,
        attempts = settings.max_attempts,
        "config.resolved"
    );

    let ctx = Ctx::new(settings);
    let store = ConfigStore::new(path);
    handlers::run(&ctx, &store, cli.command).await
}
