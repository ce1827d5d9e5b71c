//! Procedure runner
//!
//! Runs a job against the store and turns every failure into a logged
//! `RunOutcome::Failed`. Nothing a job does escapes as an error: the
//! scheduler tick or trigger that started it always completes.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info};

use crate::db::ProcedureStore;
use crate::job::{Job, RunOutcome, RunReport, Trigger};
use crate::stats::RunStats;

pub struct ProcedureRunner {
    store: Arc<dyn ProcedureStore>,
    stats: RunStats,
}

impl ProcedureRunner {
    pub fn new(store: Arc<dyn ProcedureStore>) -> Self {
        Self {
            store,
            stats: RunStats::new(),
        }
    }

    /// `CALL public.update_achievements();`
    pub async fn run_procedure(&self, trigger: Trigger) -> RunReport {
        self.run(Job::Procedure, trigger).await
    }

    /// `SELECT 1;`, result discarded
    pub async fn run_health_query(&self, trigger: Trigger) -> RunReport {
        self.run(Job::HealthQuery, trigger).await
    }

    pub async fn run(&self, job: Job, trigger: Trigger) -> RunReport {
        info!(%job, %trigger, "Start {}", job);

        let started_at = Utc::now();
        let clock = Instant::now();

        let outcome = match self.store.execute(job).await {
            Ok(()) => RunOutcome::Succeeded,
            Err(e) => {
                error!(%job, %trigger, error = %e, "{} error", job);
                RunOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        let report = RunReport {
            job,
            trigger,
            started_at,
            duration_ms: clock.elapsed().as_millis() as u64,
            outcome,
        };
        self.stats.record(&report);

        info!(
            %job,
            %trigger,
            duration_ms = report.duration_ms,
            success = report.outcome.is_success(),
            "End {}",
            job
        );

        report
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }
}
