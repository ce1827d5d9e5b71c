//! Fire-and-forget job submission
//!
//! `submit` spawns the job on the runtime and returns at once. The caller
//! gets a `Submission` it can drop (HTTP triggers) or await for the
//! eventual `RunReport` (tests, CLI).

use std::sync::Arc;

use tokio::sync::oneshot;

use crate::job::{Job, RunReport, Trigger};
use crate::runner::ProcedureRunner;

/// Handle to a job running in the background.
#[derive(Debug)]
pub struct Submission {
    pub job: Job,
    completion: oneshot::Receiver<RunReport>,
}

impl Submission {
    /// Wait for the run to finish. `None` if the task was torn down first.
    pub async fn wait(self) -> Option<RunReport> {
        self.completion.await.ok()
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    runner: Arc<ProcedureRunner>,
}

impl Dispatcher {
    pub fn new(runner: Arc<ProcedureRunner>) -> Self {
        Self { runner }
    }

    pub fn submit(&self, job: Job, trigger: Trigger) -> Submission {
        let (tx, rx) = oneshot::channel();
        let runner = self.runner.clone();

        tokio::spawn(async move {
            let report = runner.run(job, trigger).await;
            // Receiver is gone when the submitter did not care about the outcome.
            let _ = tx.send(report);
        });

        tracing::debug!(%job, %trigger, "job submitted");
        Submission {
            job,
            completion: rx,
        }
    }

    pub fn runner(&self) -> &Arc<ProcedureRunner> {
        &self.runner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MockStore;
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn submit_returns_before_job_finishes() {
        let store = Arc::new(MockStore::new().with_delay(Duration::from_millis(500)));
        let dispatcher = Dispatcher::new(Arc::new(ProcedureRunner::new(store.clone())));

        let started = Instant::now();
        let submission = dispatcher.submit(Job::Procedure, Trigger::Http);
        assert!(started.elapsed() < Duration::from_millis(50));
        assert_eq!(store.completed(), 0);

        let report = submission.wait().await.expect("job should report");
        assert!(report.outcome.is_success());
        assert_eq!(store.completed(), 1);
    }

    #[tokio::test]
    async fn dropped_submission_still_runs() {
        let store = Arc::new(MockStore::new());
        let runner = Arc::new(ProcedureRunner::new(store.clone()));
        let dispatcher = Dispatcher::new(runner.clone());

        drop(dispatcher.submit(Job::HealthQuery, Trigger::Http));

        // Give the spawned task a chance to run.
        for _ in 0..50 {
            if store.completed() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.call_count(Job::HealthQuery), 1);
        assert_eq!(runner.stats().snapshot().health_query.runs, 1);
    }

    #[tokio::test]
    async fn failed_job_reports_failure_to_waiter() {
        let store = Arc::new(MockStore::new().failing());
        let dispatcher = Dispatcher::new(Arc::new(ProcedureRunner::new(store)));

        let report = dispatcher
            .submit(Job::Procedure, Trigger::Http)
            .wait()
            .await
            .unwrap();
        assert!(!report.outcome.is_success());
    }
}
