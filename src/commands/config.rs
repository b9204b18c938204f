use anyhow::Result;
use ball_costing::config::{self, Config};
use colored::Colorize;
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the current configuration with the rates API key masked
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());

    let cfg = config::load_config(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());

    let cfg = config::load_config(config_path)?;

    println!("{}", "Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Listen address: {}:{}", cfg.server.host, cfg.server.port);
    println!("  Database: {}", cfg.database.url);
    println!("  Rate source: {}", cfg.rates.base_url);
    println!("  Staleness window: {}s", cfg.rates.staleness_seconds);
    println!(
        "  Rates API key: {}",
        if cfg.rates.api_key.is_some() {
            "configured"
        } else {
            "absent (USD-only operation)"
        }
    );

    info!("Configuration validation successful");
    Ok(())
}

/// Mask the rates API key for safe display
fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    sanitized.rates.api_key = sanitized.rates.api_key.map(|key| mask_api_key(&key));
    sanitized
}

/// Show only the first 4 and last 4 characters of a key
fn mask_api_key(key: &str) -> String {
    if key.len() <= 8 {
        return "*".repeat(key.len());
    }
    format!("{}...{}", &key[..4], &key[key.len() - 4..])
}
