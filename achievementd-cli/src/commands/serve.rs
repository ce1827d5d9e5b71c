//! Long-running server command
//!
//! Runs the procedure scheduler and the manual trigger endpoints until
//! Ctrl+C or SIGTERM.

use std::net::SocketAddr;

use achievementd_server::http::shutdown_signal;
use achievementd_server::run_service;
use anyhow::{Context, Result};
use clap::Parser;

use super::ConfigArgs;

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Address to bind to (overrides `bind` from the config file)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,
}

pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = args.config.load()?;
    if let Some(bind) = args.bind {
        config.bind = bind;
    }

    tracing::info!(
        bind = %config.bind,
        schedule = %config.schedule,
        "Starting achievementd"
    );

    run_service(config, shutdown_signal())
        .await
        .context("Server error")?;

    Ok(())
}
