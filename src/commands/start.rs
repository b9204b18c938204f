use anyhow::Result;
use ball_costing::{config, server};
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the start command
///
/// Loads configuration and runs the server until shutdown.
pub async fn execute(config_path: &Path) -> Result<()> {
    println!("{}", "Starting ball costing server...".green());

    let cfg = config::load_config(config_path)?;
    info!("Configuration loaded from {}", config_path.display());

    // Blocks until shutdown
    server::start_server(cfg).await?;

    Ok(())
}
