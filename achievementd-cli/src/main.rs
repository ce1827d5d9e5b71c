use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use commands::serve::ServeArgs;
use commands::ConfigArgs;
use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "achievementd",
    author,
    version,
    about = "Scheduled runner for the achievement update procedure",
    long_about = "Calls public.update_achievements() once a minute against the configured \
                  PostgreSQL database and exposes manual HTTP triggers for operators."
)]
struct Cli {
    /// Enable debug logging (unless RUST_LOG is set)
    #[arg(long, global = true)]
    debug: bool,

    /// Export traces over OTLP (requires the `telemetry` feature)
    #[arg(long, global = true)]
    otel: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scheduler and the HTTP trigger endpoints
    Serve(ServeArgs),
    /// Run the achievement update procedure once and exit
    Run(ConfigArgs),
    /// Run the connectivity test query once and exit
    Ping(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Missing .env is fine; the config file is the source of truth.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_setup::init(&TracingConfig {
        debug: cli.debug,
        otel: cli.otel,
    })
    .ok();

    let result = match cli.command {
        Commands::Serve(args) => commands::run_serve(args).await,
        Commands::Run(args) => commands::run_procedure(args).await,
        Commands::Ping(args) => commands::run_ping(args).await,
    };

    tracing_setup::shutdown_otel();
    result
}
