//! riverdata entry point.

use clap::Parser;
use riverdata_cli::cli::Cli;
use riverdata_cli::commands;
use riverdata_cli::config::RiverDataConfig;
use riverdata_cli::error::CliError;
use riverdata_cli::logging::init_logging;

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    let config = RiverDataConfig::load(cli.config.as_deref())?;
    init_logging(&config.log)?;

    tracing::debug!(
        store_path = %config.store_path.display(),
        api_base_url = %config.api_base_url,
        "Configuration loaded"
    );

    let output = commands::run(&cli, &config).await?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}
