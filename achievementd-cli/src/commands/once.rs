//! One-shot commands: run a job once and exit
//!
//! Exit status is non-zero when the job failed, so these double as cron
//! or healthcheck hooks outside the long-running server.

use achievementd_server::{run_once, Job, RunOutcome};
use anyhow::{bail, Result};

use super::ConfigArgs;

/// Run `CALL public.update_achievements();` once
pub async fn run_procedure(args: ConfigArgs) -> Result<()> {
    run_job(args, Job::Procedure).await
}

/// Run `SELECT 1;` once to check connectivity
pub async fn run_ping(args: ConfigArgs) -> Result<()> {
    run_job(args, Job::HealthQuery).await
}

async fn run_job(args: ConfigArgs, job: Job) -> Result<()> {
    let config = args.load()?;
    let report = run_once(&config, job).await;

    match report.outcome {
        RunOutcome::Succeeded => {
            println!("{} succeeded in {} ms", job, report.duration_ms);
            Ok(())
        }
        RunOutcome::Failed { error } => bail!("{} failed: {}", job, error),
    }
}
