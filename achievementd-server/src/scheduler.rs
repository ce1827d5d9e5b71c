//! Cron-driven procedure scheduler
//!
//! Sleeps until the next wall-clock fire time of a six-field cron
//! expression (UTC), then hands the procedure to the runner in its own
//! task. With `OverlapPolicy::Skip` a tick that lands while the previous
//! scheduled run is still going is dropped and counted instead.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use cron::Schedule;
use serde::{Deserialize, Serialize};
use tokio::sync::{watch, Semaphore};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::job::{Job, Trigger};
use crate::runner::ProcedureRunner;

#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("invalid schedule expression {expression:?}: {source}")]
    Invalid {
        expression: String,
        #[source]
        source: cron::error::Error,
    },
}

/// What to do when a tick fires while the previous scheduled run is in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    #[default]
    Skip,
    Allow,
}

pub fn parse_schedule(expression: &str) -> Result<Schedule, ScheduleError> {
    Schedule::from_str(expression).map_err(|source| ScheduleError::Invalid {
        expression: expression.to_string(),
        source,
    })
}

pub struct Scheduler {
    schedule: Schedule,
    overlap: OverlapPolicy,
    runner: Arc<ProcedureRunner>,
    in_flight: Arc<Semaphore>,
}

impl Scheduler {
    pub fn new(
        expression: &str,
        overlap: OverlapPolicy,
        runner: Arc<ProcedureRunner>,
    ) -> Result<Self, ScheduleError> {
        Ok(Self {
            schedule: parse_schedule(expression)?,
            overlap,
            runner,
            in_flight: Arc::new(Semaphore::new(1)),
        })
    }

    /// First fire time strictly after `after`.
    pub fn next_fire_after(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&after).next()
    }

    /// Run the tick loop until `shutdown` flips to `true` or its sender drops.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(self.run(shutdown))
    }

    async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!(schedule = %self.schedule, overlap = ?self.overlap, "scheduler started");
        let mut last_fire: Option<DateTime<Utc>> = None;

        loop {
            let now = Utc::now();
            // Waking a hair before the fire time must not yield the same slot twice.
            let from = last_fire.map_or(now, |last| last.max(now));
            let Some(next) = self.next_fire_after(from) else {
                warn!("schedule has no upcoming fire times, stopping");
                break;
            };
            let delay = (next - now).to_std().unwrap_or_default();

            tokio::select! {
                _ = tokio::time::sleep(delay) => {
                    last_fire = Some(next);
                    self.tick(next);
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("scheduler stopped");
    }

    fn tick(&self, fire_time: DateTime<Utc>) {
        let runner = self.runner.clone();

        match self.overlap {
            OverlapPolicy::Allow => {
                tokio::spawn(async move {
                    runner.run_procedure(Trigger::Schedule).await;
                });
            }
            OverlapPolicy::Skip => match self.in_flight.clone().try_acquire_owned() {
                Ok(permit) => {
                    tokio::spawn(async move {
                        runner.run_procedure(Trigger::Schedule).await;
                        drop(permit);
                    });
                }
                Err(_) => {
                    warn!(%fire_time, "previous scheduled run still in flight, skipping tick");
                    runner.stats().record_skip(Job::Procedure);
                }
            },
        }
    }
}
