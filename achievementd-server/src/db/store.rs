//! Procedure store trait and implementations
//!
//! Provides a seam for executing jobs against the database, with:
//! - Real implementation backed by the sqlx pool
//! - Mock implementation for testing

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::job::Job;

/// Every failure this service can hit at runtime, acquisition and execution alike.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database operation failed: {0}")]
    Operation(#[from] sqlx::Error),
}

/// Executes a job's statement on one borrowed connection.
#[async_trait]
pub trait ProcedureStore: Send + Sync + 'static {
    async fn execute(&self, job: Job) -> Result<(), DbError>;
}

/// Store backed by the process-wide pool.
#[derive(Clone)]
pub struct PgProcedureStore {
    pool: PgPool,
}

impl PgProcedureStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ProcedureStore for PgProcedureStore {
    async fn execute(&self, job: Job) -> Result<(), DbError> {
        // The connection goes back to the pool when `conn` drops, on every path out.
        let mut conn = self.pool.acquire().await?;

        // Simple query protocol: CALL is not preparable on every server version.
        sqlx::Executor::execute(&mut *conn, sqlx::raw_sql(job.statement())).await?;

        Ok(())
    }
}

/// Mock store for testing
///
/// Records every call, tracks borrow/return balance and the peak number of
/// concurrent executions.
#[derive(Default)]
pub struct MockStore {
    delay: Duration,
    fail: bool,
    calls: Mutex<Vec<Job>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    acquired: AtomicUsize,
    released: AtomicUsize,
    completed: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold each simulated connection for `delay` before finishing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Make every execution fail after its delay.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn calls(&self) -> Vec<Job> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, job: Job) -> usize {
        self.calls.lock().unwrap().iter().filter(|j| **j == job).count()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

/// Simulated borrowed connection; returns itself on drop.
struct Lease<'a> {
    store: &'a MockStore,
}

impl<'a> Lease<'a> {
    fn acquire(store: &'a MockStore) -> Self {
        store.acquired.fetch_add(1, Ordering::SeqCst);
        let now = store.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        store.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self { store }
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        self.store.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.store.released.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProcedureStore for MockStore {
    async fn execute(&self, job: Job) -> Result<(), DbError> {
        let _lease = Lease::acquire(self);
        self.calls.lock().unwrap().push(job);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.fail {
            return Err(DbError::Operation(sqlx::Error::PoolTimedOut));
        }

        self.completed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
