//! Process wiring
//!
//! Owns the lifecycle of the pool, the scheduler task and the HTTP server.
//! Everything below this point receives its dependencies by handle.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;

use crate::config::ServiceConfig;
use crate::db::{create_pool, PgProcedureStore};
use crate::error::ServerResult;
use crate::http::run_server;
use crate::job::{Job, RunReport, Trigger};
use crate::runner::ProcedureRunner;
use crate::scheduler::Scheduler;
use crate::state::AppState;

/// How long shutdown waits for checked-out connections before abandoning them
pub const POOL_CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Run scheduler and HTTP server until `shutdown` resolves.
pub async fn run_service<F>(config: ServiceConfig, shutdown: F) -> ServerResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let pool = create_pool(&config);
    let runner = Arc::new(ProcedureRunner::new(Arc::new(PgProcedureStore::new(
        pool.clone(),
    ))));

    let scheduler = Scheduler::new(&config.schedule, config.overlap, runner.clone())?;
    let (stop_tx, stop_rx) = watch::channel(false);
    let scheduler_task = scheduler.spawn(stop_rx);

    let result = run_server(AppState::new(runner), config.bind, shutdown).await;

    // Stop ticking even when the server failed to bind.
    let _ = stop_tx.send(true);
    if let Err(e) = scheduler_task.await {
        tracing::error!(error = %e, "scheduler task panicked");
    }

    // A hung CALL holds its connection indefinitely; don't let it pin the process.
    if !finishes_within(POOL_CLOSE_GRACE, pool.close()).await {
        tracing::warn!(
            grace_secs = POOL_CLOSE_GRACE.as_secs(),
            checked_out = (pool.size() as usize).saturating_sub(pool.num_idle()),
            "connections still in use after shutdown grace period, abandoning them"
        );
    }
    result
}

/// `true` if `fut` completed before `grace` ran out.
async fn finishes_within<F>(grace: Duration, fut: F) -> bool
where
    F: Future<Output = ()>,
{
    tokio::time::timeout(grace, fut).await.is_ok()
}

/// Run a single job outside the schedule and report how it went.
pub async fn run_once(config: &ServiceConfig, job: Job) -> RunReport {
    let pool = create_pool(config);
    let runner = ProcedureRunner::new(Arc::new(PgProcedureStore::new(pool.clone())));

    let report = runner.run(job, Trigger::Cli).await;

    pool.close().await;
    report
}
