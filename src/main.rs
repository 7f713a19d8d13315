use clap::Parser;

use nudge_rs::cli::{Cli, execute_command, init_logger_from_settings, load_and_merge_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = load_and_merge_config(&cli)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;
    let log_handle = init_logger_from_settings(&settings)?;

    execute_command(&cli, settings, Some(log_handle)).await?;
    Ok(())
}
