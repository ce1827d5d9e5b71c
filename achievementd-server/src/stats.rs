//! In-memory run statistics, served by `GET /status`

use std::sync::Mutex;

use serde::Serialize;

use crate::job::{Job, RunReport};

#[derive(Debug, Clone, Default, Serialize)]
pub struct JobStats {
    pub runs: u64,
    pub failures: u64,
    /// Scheduled ticks dropped because the previous run was still in flight
    pub skipped_ticks: u64,
    pub last: Option<RunReport>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct StatsSnapshot {
    pub procedure: JobStats,
    pub health_query: JobStats,
}

impl StatsSnapshot {
    pub fn job(&self, job: Job) -> &JobStats {
        match job {
            Job::Procedure => &self.procedure,
            Job::HealthQuery => &self.health_query,
        }
    }

    fn job_mut(&mut self, job: Job) -> &mut JobStats {
        match job {
            Job::Procedure => &mut self.procedure,
            Job::HealthQuery => &mut self.health_query,
        }
    }
}

#[derive(Debug, Default)]
pub struct RunStats {
    inner: Mutex<StatsSnapshot>,
}

impl RunStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, report: &RunReport) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let stats = inner.job_mut(report.job);
        stats.runs += 1;
        if !report.outcome.is_success() {
            stats.failures += 1;
        }
        stats.last = Some(report.clone());
    }

    pub fn record_skip(&self, job: Job) {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.job_mut(job).skipped_ticks += 1;
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}
