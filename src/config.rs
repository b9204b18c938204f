use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub rates: RatesConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// SQLite database URL, e.g. "sqlite:./data/costing.db"
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RatesConfig {
    /// Fixer-style access key. Optional: without it the service still works
    /// for USD-only requests; non-USD conversions fail with a distinct
    /// missing-credential error.
    pub api_key: Option<String>,
    pub base_url: String,
    pub staleness_seconds: u64,
    pub timeout_seconds: u64,
}

pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    let config = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(config::Environment::with_prefix("BALL_COSTING").separator("__"))
        .build()?;

    let cfg: Config = config.try_deserialize()?;
    validate_config(&cfg)?;

    Ok(cfg)
}

fn validate_config(cfg: &Config) -> anyhow::Result<()> {
    if cfg.server.host.is_empty() {
        anyhow::bail!("Server host cannot be empty");
    }

    if cfg.database.url.is_empty() {
        anyhow::bail!("Database URL cannot be empty");
    }

    if cfg.rates.base_url.is_empty() {
        anyhow::bail!("Rates base URL cannot be empty");
    }

    if cfg.rates.timeout_seconds == 0 {
        anyhow::bail!("Rates timeout must be at least 1 second");
    }

    if let Some(key) = &cfg.rates.api_key {
        if key.is_empty() {
            anyhow::bail!("Rates API key cannot be an empty string; omit it instead");
        }
    }

    Ok(())
}
