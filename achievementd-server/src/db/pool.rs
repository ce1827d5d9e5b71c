//! Database connection pool management
//!
//! The pool connects lazily: the service comes up even when Postgres is
//! unreachable, and each job reports its own connection failure.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use crate::config::ServiceConfig;

/// Create the process-wide PostgreSQL pool.
///
/// Sizing and acquire timeout fall back to sqlx defaults unless the config
/// sets them. Must be called from within a tokio runtime.
///
/// # Example
///
/// ```ignore
/// let config = ServiceConfig::load(Path::new("database/db_config.json"))?;
/// let pool = create_pool(&config);
/// ```
pub fn create_pool(config: &ServiceConfig) -> PgPool {
    let mut options = PgPoolOptions::new();

    if let Some(max_connections) = config.max_connections {
        options = options.max_connections(max_connections);
    }

    if let Some(timeout) = config.acquire_timeout() {
        options = options.acquire_timeout(timeout);
    }

    tracing::debug!(
        host = %config.host,
        port = config.port,
        database = %config.database,
        max_connections = options.get_max_connections(),
        "creating connection pool"
    );

    options.connect_lazy_with(config.connect_options())
}
