//! Command implementations for the achievementd CLI

pub mod once;
pub mod serve;

use std::path::{Path, PathBuf};

use achievementd_server::config::DEFAULT_CONFIG_PATH;
use achievementd_server::ServiceConfig;
use anyhow::{Context, Result};
use clap::Args;

pub use once::{run_ping, run_procedure};
pub use serve::run_serve;

/// Config file location shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Path to the JSON file with host, port, user, password and database
    #[arg(
        long,
        short = 'c',
        env = "ACHIEVEMENTD_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    pub config: PathBuf,
}

impl ConfigArgs {
    pub fn load(&self) -> Result<ServiceConfig> {
        load_config(&self.config)
    }
}

fn load_config(path: &Path) -> Result<ServiceConfig> {
    let config = ServiceConfig::load(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    tracing::debug!(?config, "config loaded");
    Ok(config)
}
